use std::sync::Arc;

use object_store::ObjectStore;
use zarrs::storage::{AsyncListableStorageTraits, StorePrefix};
use zarrs_object_store::AsyncObjectStore;

use crate::error::{IoError, PixelsError};

/// Async zarrs store over any object_store backend.
pub type PyramidStore = AsyncObjectStore<Arc<dyn ObjectStore>>;

/// Trait for opening a storage root from a root location string.
///
/// This abstraction lets the locator hand out local and object-storage
/// roots through the same interface. Opening a root performs no existence
/// check on the NGFF data itself.
pub trait StoreSource: Send + Sync {
    /// Open the store rooted at `location`.
    fn open(&self, location: &str) -> Result<StoreRoot, PixelsError>;
}

/// An opened storage root.
///
/// Holds the zarrs store plus the key prefix inside that store under which
/// fileset directories live. Cheap to clone.
#[derive(Clone)]
pub struct StoreRoot {
    store: Arc<PyramidStore>,
    prefix: String,
    identifier: String,
}

impl StoreRoot {
    /// Wrap an object store.
    ///
    /// `prefix` is the key prefix inside the store (may be empty),
    /// `identifier` is used for logging and path display.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        let identifier = identifier.into().trim_end_matches('/').to_string();
        Self {
            store: Arc::new(AsyncObjectStore::new(store)),
            prefix,
            identifier,
        }
    }

    /// The zarrs store.
    pub fn store(&self) -> Arc<PyramidStore> {
        Arc::clone(&self.store)
    }

    /// Key prefix inside the store.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Root location, for logging.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Absolute zarrs node path (`/prefix/key`) for a key relative to the root.
    pub fn node_path(&self, key: &str) -> String {
        let key = key.trim_matches('/');
        match (self.prefix.is_empty(), key.is_empty()) {
            (true, _) => format!("/{}", key),
            (false, true) => format!("/{}", self.prefix),
            (false, false) => format!("/{}/{}", self.prefix, key),
        }
    }

    /// Human-readable location of a key, e.g. `s3://bucket/7.zarr/0/0`.
    pub fn display_path(&self, key: &str) -> String {
        format!("{}/{}", self.identifier, key.trim_matches('/'))
    }

    /// Names of the direct child directories of `key`.
    ///
    /// Returns an empty list when `key` has no children.
    pub async fn child_names(&self, key: &str) -> Result<Vec<String>, PixelsError> {
        let dir = self.node_path(key);
        let dir = dir.trim_start_matches('/');
        let prefix = if dir.is_empty() {
            StorePrefix::root()
        } else {
            StorePrefix::new(format!("{}/", dir))
                .map_err(|e| PixelsError::InvalidArgument(e.to_string()))?
        };

        let listing = self
            .store
            .list_dir(&prefix)
            .await
            .map_err(|e| IoError::Storage(e.to_string()))?;

        Ok(listing
            .prefixes()
            .iter()
            .filter_map(|p| {
                p.as_str()
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .map(str::to_string)
            })
            .collect())
    }
}

impl std::fmt::Debug for StoreRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRoot")
            .field("prefix", &self.prefix)
            .field("identifier", &self.identifier)
            .finish()
    }
}
