//! Local filesystem store source.

use std::path::Path;
use std::sync::Arc;

use object_store::local::LocalFileSystem;
use tracing::debug;

use crate::error::PixelsError;

use super::store::{StoreRoot, StoreSource};

/// Filesystem-backed implementation of `StoreSource`.
///
/// The location is a directory path, made absolute but not resolved on
/// disk. The store is rooted at `/` and the location becomes its key
/// prefix, so a directory that does not exist is only noticed by the
/// first read, which reports it as not found.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoreSource;

impl LocalStoreSource {
    pub fn new() -> Self {
        Self
    }
}

impl StoreSource for LocalStoreSource {
    fn open(&self, location: &str) -> Result<StoreRoot, PixelsError> {
        let absolute = std::path::absolute(Path::new(location)).map_err(|e| {
            debug!(path = location, "Cannot resolve local NGFF root: {}", e);
            PixelsError::InvalidArgument(format!("invalid local root {:?}: {}", location, e))
        })?;
        let prefix = absolute.to_string_lossy().into_owned();

        Ok(StoreRoot::new(Arc::new(LocalFileSystem::new()), prefix, location))
    }
}
