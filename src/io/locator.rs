use tracing::error;

use crate::config::{PixelsConfig, S3Settings};
use crate::error::PixelsError;

use super::local_source::LocalStoreSource;
use super::s3_source::{S3StoreSource, S3_SCHEME};
use super::store::{StoreRoot, StoreSource};

/// Maps NGFF root strings to opened storage roots.
///
/// The backend is chosen by the root string: anything starting with
/// `s3://` goes to the object-storage source, everything else is a local
/// path. The object-storage source exists only if credentials were
/// configured when the locator was built.
#[derive(Debug, Clone, Default)]
pub struct StorageLocator {
    local: LocalStoreSource,
    s3: Option<S3StoreSource>,
}

impl StorageLocator {
    /// Create a locator with optional object-storage settings.
    pub fn new(s3: Option<S3Settings>) -> Self {
        Self {
            local: LocalStoreSource::new(),
            s3: s3.map(S3StoreSource::new),
        }
    }

    /// Create a locator from process configuration.
    pub fn from_config(config: &PixelsConfig) -> Self {
        Self::new(config.s3_settings())
    }

    /// Create a locator that only serves local paths.
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Whether object-storage roots can be served.
    pub fn has_object_storage(&self) -> bool {
        self.s3.is_some()
    }

    /// Open the storage root for `root`.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `root` is an `s3://` URI but no object storage
    ///   was configured
    /// - `InvalidArgument` if a local root cannot be made absolute
    ///
    /// A local root that does not exist is not detected here; the first
    /// read under it reports not found.
    pub fn locate(&self, root: &str) -> Result<StoreRoot, PixelsError> {
        self.source_for(root)?.open(root)
    }

    fn source_for(&self, root: &str) -> Result<&dyn StoreSource, PixelsError> {
        if root.starts_with(S3_SCHEME) {
            match &self.s3 {
                Some(source) => Ok(source),
                None => {
                    error!(root = root, "Cannot get s3 path: object storage is not configured");
                    Err(PixelsError::Configuration(format!(
                        "object storage requested for {} but no S3 credentials are configured",
                        root
                    )))
                }
            }
        } else {
            Ok(&self.local)
        }
    }
}
