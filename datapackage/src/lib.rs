//! datapackage - typed access to tabular data packages
//!
//! A data package is a directory or base URL holding a `datapackage.json`
//! descriptor plus one or more CSV resources. This library loads the
//! descriptor, indexes its resources, and streams each resource's rows with
//! every cell coerced to the type its schema declares.
//!
//! # Example
//!
//! ```ignore
//! use datapackage::DataPackage;
//!
//! let package = DataPackage::open("tests/fixtures/cities")?;
//! println!("{}", package.descriptor().name()?);
//!
//! for row in package.get_data("cities")? {
//!     let row = row?;
//!     println!("{:?}", row.get("population"));
//! }
//! ```
//!
//! Rows are produced lazily and the first failing cell ends the stream with
//! an error naming the field and the zero-based data row.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod location;
pub mod logging;
pub mod opener;
pub mod package;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod stream;
pub mod value;

pub use descriptor::{Descriptor, License, Source};
pub use error::{PackageError, PackageResult};
pub use opener::{DefaultOpener, Opener};
pub use package::DataPackage;
pub use schema::{FieldSpec, FieldType, ResourceEntry};
pub use stream::{PackageRows, ResourceRows};
pub use value::{GeoPoint, ParsedRow, Value};
