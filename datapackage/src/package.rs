//! The data package facade.
//!
//! [`DataPackage`] ties together the base location, the opener, the parsed
//! descriptor and the resource registry. Loading fetches and parses
//! `datapackage.json` once; everything after that is read-only.

use std::io::Read;

use tracing::{debug, info};

use crate::config::HttpConfig;
use crate::descriptor::{Descriptor, DESCRIPTOR_FILE};
use crate::error::{PackageError, PackageResult};
use crate::location::BaseLocation;
use crate::opener::{ByteStream, DefaultOpener, OpenError, Opener};
use crate::registry::ResourceRegistry;
use crate::schema::ResourceEntry;
use crate::stream::{locate, PackageRows, ResourceRows};

/// A loaded data package.
#[derive(Debug)]
pub struct DataPackage<O: Opener = DefaultOpener> {
    base: BaseLocation,
    opener: O,
    descriptor: Descriptor,
    registry: ResourceRegistry,
}

impl DataPackage<DefaultOpener> {
    /// Load a package from a directory path or base URL using the default
    /// opener.
    pub fn open(uri: &str) -> PackageResult<Self> {
        let opener = DefaultOpener::new().map_err(PackageError::OpenerInit)?;
        Self::open_with(uri, opener)
    }

    /// Load a package using the default opener with explicit HTTP settings.
    pub fn open_with_config(uri: &str, config: &HttpConfig) -> PackageResult<Self> {
        let opener = DefaultOpener::with_config(config).map_err(PackageError::OpenerInit)?;
        Self::open_with(uri, opener)
    }
}

impl<O: Opener> DataPackage<O> {
    /// Load a package, fetching the descriptor and every resource through
    /// `opener`.
    pub fn open_with(uri: &str, opener: O) -> PackageResult<Self> {
        let base = BaseLocation::parse(uri)?;
        let location = base.resolve(DESCRIPTOR_FILE)?;

        let bytes = read_descriptor(&opener, &location)?;
        let descriptor = Descriptor::from_slice(&bytes, &location)?;
        let registry = ResourceRegistry::from_descriptor_resources(descriptor.resources());

        info!(
            base = %base,
            resources = registry.len(),
            "Loaded data package"
        );

        Ok(Self {
            base,
            opener,
            descriptor,
            registry,
        })
    }

    /// Where the package lives.
    pub fn base(&self) -> &BaseLocation {
        &self.base
    }

    /// The parsed descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The opener used for resource streams.
    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Resolve a descriptor-relative reference against the package base.
    pub fn resolve_location(&self, reference: &str) -> PackageResult<String> {
        self.base.resolve(reference)
    }

    /// Resolve a reference and open its raw byte stream.
    pub fn open_resource(&self, reference: &str) -> PackageResult<ByteStream> {
        let location = self.resolve_location(reference)?;
        self.opener
            .open(&location)
            .map_err(|source| PackageError::Open { location, source })
    }

    /// Resources in descriptor order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.registry.iter()
    }

    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> PackageResult<&ResourceEntry> {
        self.registry.get(name)
    }

    /// Stream the rows of one resource.
    ///
    /// The resource is opened immediately; the header is read on the first
    /// call to `next()`.
    pub fn get_data(&self, name: &str) -> PackageResult<ResourceRows> {
        let entry = self.registry.get(name)?;
        let location = locate(&self.base, entry)?;
        debug!(resource = %name, location = %location, "Streaming resource");
        ResourceRows::open(entry, &location, &self.opener)
    }

    /// Like [`get_data`](Self::get_data), but falls back to the legacy
    /// resource `id` when `name` is empty.
    pub fn get_data_by_id(&self, name: &str, id: &str) -> PackageResult<ResourceRows> {
        if name.is_empty() {
            self.get_data(id)
        } else {
            self.get_data(name)
        }
    }

    /// Rows of every resource, one resource after another.
    pub fn rows(&self) -> PackageRows<'_, O> {
        PackageRows::new(&self.base, &self.opener, self.registry.iter().collect())
    }
}

fn read_descriptor<O: Opener>(opener: &O, location: &str) -> PackageResult<Vec<u8>> {
    let fetch_err = |source| PackageError::DescriptorFetch {
        location: location.to_string(),
        source,
    };

    let mut stream = opener.open(location).map_err(fetch_err)?;
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| fetch_err(OpenError::io(location, e)))?;

    debug!(location = %location, bytes = bytes.len(), "Read descriptor");
    Ok(bytes)
}
