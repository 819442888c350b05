//! Storage layer.
//!
//! Both backends are object_store implementations wrapped for zarrs:
//!
//! ```text
//! root string ──► StorageLocator ──┬─► LocalStoreSource ──► LocalFileSystem ─┐
//!                                  │                                         ├─► StoreRoot
//!                                  └─► S3StoreSource ─────► AmazonS3 ────────┘
//! ```

mod local_source;
mod locator;
mod s3_source;
mod store;

pub use local_source::LocalStoreSource;
pub use locator::StorageLocator;
pub use s3_source::{parse_s3_location, S3StoreSource, S3_SCHEME};
pub use store::{PyramidStore, StoreRoot, StoreSource};
