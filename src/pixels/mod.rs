//! Typed pixel extraction.
//!
//! # Components
//!
//! - [`PixelType`]: Closed set of numeric encodings, with codes and names
//! - [`min_max`]: Scalar range of a big-endian pixel buffer
//! - [`read_region`]: Sub-region read re-serialized as big-endian bytes
//! - [`PixelsService`]: Host-facing read API over identities and selections
//! - [`PixelProvider`]: The read operations a pyramid buffer depends on

mod extractor;
mod pixel_type;
mod service;

pub use extractor::{
    check_dimensionality, chunk_shape, open_array, read_region, PixelArray, PixelData,
};
pub use pixel_type::{min_max, type_name, PixelType};
pub use service::{PixelProvider, PixelsService};
