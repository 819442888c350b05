//! Per-image pixel buffer facade.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            PyramidBuffer                │
//! │  (current level, inverted indexing)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          PixelProvider Trait            │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            PixelsService                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let service = Arc::new(PixelsService::from_config(&config)?);
//! let mut buffer = PyramidBuffer::open(service, ImageIdentity::new(root, 7, 0)).await?;
//!
//! buffer.set_level(0)?;
//! let tile = buffer.tile(0, 0, 0, 0, 0, 256, 256).await?;
//! ```

mod pyramid_buffer;

pub use pyramid_buffer::PyramidBuffer;
