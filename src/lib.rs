//! # NGFF Pixels
//!
//! Region and tile access to multi-resolution NGFF/Zarr pixel pyramids
//! stored on local disk or in S3-compatible object storage.
//!
//! A caller names an image (root, fileset, series, optional plate
//! coordinates), a resolution level and a 5-D region over
//! (t, c, z, y, x). The library resolves the physical array, reads only
//! the chunks the region touches, and returns the pixels as big-endian
//! bytes tagged with their numeric type.
//!
//! ## Features
//!
//! - **Backend-agnostic roots**: local paths and `s3://bucket[/prefix]` URIs
//! - **Region selection**: `[t,c,z,y0:y1,x0:x1]` strings with tile size limits
//! - **Fixed wire format**: integer pixels re-encoded big-endian whatever the source order
//! - **Pyramid buffer**: per-image handle with inverted level indexing
//! - **Metadata**: sizes, type, stored min/max, multiscales with chunk sizes, rendering metadata
//!
//! ## Architecture
//!
//! - [`io`] - Storage roots over object_store (local and S3)
//! - [`pyramid`] - Image identities and physical path layout
//! - [`region`] - Region selection parsing and validation
//! - [`pixels`] - Pixel types, byte extraction and the read service
//! - [`buffer`] - Per-image pyramid buffer
//! - [`metadata`] - Group attribute aggregation
//! - [`config`] - Process-level configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ngff_pixels::{ImageIdentity, PixelsConfig, PixelsService, PyramidBuffer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ngff_pixels::PixelsError> {
//!     let service = Arc::new(PixelsService::from_config(&PixelsConfig::default())?);
//!     let image = ImageIdentity::new("/data/ngff", 7, 0);
//!
//!     let tile = service.pixel_data(&image, 0, "[0,0,0,100:150,200:260]").await?;
//!     println!("{} bytes of {}", tile.data.len(), tile.type_name());
//!
//!     let mut buffer = PyramidBuffer::open(service, image).await?;
//!     buffer.set_level(0)?;
//!     println!("levels: {:?}", buffer.resolution_descriptions().await?);
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod io;
pub mod metadata;
pub mod pixels;
pub mod pyramid;
pub mod region;

// Re-export commonly used types
pub use buffer::PyramidBuffer;
pub use config::{PixelsConfig, S3Settings, DEFAULT_MAX_TILE_LENGTH, DEFAULT_REGION};
pub use error::{IoError, PixelsError, RegionError};
pub use io::{LocalStoreSource, S3StoreSource, StorageLocator, StoreRoot, StoreSource};
pub use metadata::{ImageMetadata, ImageSize, MetadataAggregator};
pub use pixels::{min_max, type_name, PixelData, PixelProvider, PixelType, PixelsService};
pub use pyramid::{ImageIdentity, PlateCoordinates};
pub use region::RegionSelection;
