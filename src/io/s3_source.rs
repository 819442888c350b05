//! S3-backed store source.
//!
//! Roots of the form `s3://<bucket>[/<prefix>]` resolve to an object_store
//! `AmazonS3` client for that bucket, configured from the process-level
//! [`S3Settings`].

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use tracing::error;
use url::Url;

use crate::config::S3Settings;
use crate::error::{IoError, PixelsError};

use super::store::{StoreRoot, StoreSource};

/// URI scheme marker for object-storage roots.
pub const S3_SCHEME: &str = "s3://";

/// S3-backed implementation of `StoreSource`.
///
/// # Example
///
/// ```ignore
/// let source = S3StoreSource::new(settings);
/// let root = source.open("s3://imaging/ngff")?;
/// // keys under root resolve to s3://imaging/ngff/<key>
/// ```
#[derive(Debug, Clone)]
pub struct S3StoreSource {
    settings: S3Settings,
}

impl S3StoreSource {
    /// Create a new S3StoreSource with the given credentials.
    pub fn new(settings: S3Settings) -> Self {
        Self { settings }
    }

    /// Get the configured settings.
    pub fn settings(&self) -> &S3Settings {
        &self.settings
    }

    fn build(&self, bucket: &str) -> Result<Arc<dyn object_store::ObjectStore>, PixelsError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_access_key_id(&self.settings.access_key)
            .with_secret_access_key(&self.settings.secret_key)
            .with_region(&self.settings.region);

        // S3-compatible services are usually addressed over plain http
        if let Some(endpoint) = &self.settings.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| {
            error!(bucket = bucket, "Failed to create S3 client: {}", e);
            IoError::Storage(format!("Failed to create S3 client: {}", e))
        })?;

        Ok(Arc::new(store))
    }
}

/// Split an `s3://bucket/prefix` location into bucket and key prefix.
pub fn parse_s3_location(location: &str) -> Result<(String, String), PixelsError> {
    let url = Url::parse(location)
        .map_err(|e| PixelsError::InvalidArgument(format!("{}: {}", location, e)))?;

    if url.scheme() != "s3" {
        return Err(PixelsError::InvalidArgument(format!(
            "not an s3 location: {}",
            location
        )));
    }

    let bucket = url
        .host_str()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| PixelsError::InvalidArgument(format!("missing bucket: {}", location)))?;

    Ok((
        bucket.to_string(),
        url.path().trim_matches('/').to_string(),
    ))
}

impl StoreSource for S3StoreSource {
    fn open(&self, location: &str) -> Result<StoreRoot, PixelsError> {
        let (bucket, prefix) = parse_s3_location(location)?;
        let store = self.build(&bucket)?;
        Ok(StoreRoot::new(store, prefix, location))
    }
}
