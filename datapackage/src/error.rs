//! Error types for package loading and row streaming.

use thiserror::Error;

use crate::opener::OpenError;
use crate::resolver::CoercionError;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur while loading a data package or streaming its rows.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The descriptor could not be fetched from the package base.
    #[error("failed to fetch descriptor from {location}: {source}")]
    DescriptorFetch {
        location: String,
        #[source]
        source: OpenError,
    },

    /// The default opener could not be constructed.
    #[error("failed to initialise opener: {0}")]
    OpenerInit(#[source] OpenError),

    /// The descriptor was fetched but is not valid JSON.
    #[error("failed to parse descriptor from {location}: {source}")]
    DescriptorParse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor is valid JSON but not shaped like a data package.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// The package location could not be interpreted.
    #[error("invalid location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    /// No resource is registered under the requested name or id.
    #[error("resource not found: '{0}'")]
    ResourceNotFound(String),

    /// The resource declares neither `url` nor `path`.
    #[error("resource '{0}' has no url or path")]
    MissingLocation(String),

    /// Opening a resource stream failed.
    #[error("failed to open {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: OpenError,
    },

    /// The resource declares an encoding label that is not recognised.
    #[error("resource '{resource}' declares unknown encoding '{encoding}'")]
    UnknownEncoding { resource: String, encoding: String },

    /// The resource body is not well-formed CSV.
    #[error("CSV error in resource '{resource}': {source}")]
    Csv {
        resource: String,
        #[source]
        source: csv::Error,
    },

    /// A cell could not be coerced to its declared field type.
    #[error("Field \"{field}\" in row {row} could not be parsed: {source}")]
    FieldCoercion {
        field: String,
        row: usize,
        #[source]
        source: CoercionError,
    },

    /// A data row has fewer cells than the schema has fields.
    #[error("Field \"{field}\" in row {row} is missing")]
    MissingCell { field: String, row: usize },

    /// A required metadata key is absent or empty.
    #[error("datapackage does not have a {0}")]
    MissingMetadata(&'static str),

    /// The package version is not a semantic version.
    #[error("version '{value}' does not follow semantic versioning: {source}")]
    InvalidVersion {
        value: String,
        #[source]
        source: semver::Error,
    },
}

impl PackageError {
    /// Returns the field name and row index for cell-level failures.
    pub fn cell_context(&self) -> Option<(&str, usize)> {
        match self {
            Self::FieldCoercion { field, row, .. } | Self::MissingCell { field, row } => {
                Some((field.as_str(), *row))
            }
            _ => None,
        }
    }
}
