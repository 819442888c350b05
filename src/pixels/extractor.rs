//! Typed byte extraction from chunked arrays.
//!
//! Reads a 5-D sub-region in the array's native element type and
//! re-serializes it as one big-endian byte sequence. The output width
//! always matches the source encoding; the bytes are not self-describing,
//! so [`PixelData`] carries the [`PixelType`] alongside them.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};
use zarrs::array::{Array, ArrayCreateError, ArrayError};
use zarrs::array_subset::ArraySubset;

use crate::error::{IoError, PixelsError, RegionError};
use crate::io::{PyramidStore, StoreRoot};
use crate::region::{RegionSelection, AXIS_COUNT};

use super::pixel_type::PixelType;

/// An opened pixel array. Owned by a single read and dropped after it.
pub type PixelArray = Array<PyramidStore>;

/// Pixel bytes plus the encoding needed to interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    pub pixel_type: PixelType,

    /// Big-endian elements, `pixel_type.bytes_per_pixel()` bytes each
    pub data: Bytes,
}

impl PixelData {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len() / self.pixel_type.bytes_per_pixel()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Descriptive type name, e.g. `uint16`.
    pub fn type_name(&self) -> &'static str {
        self.pixel_type.name()
    }
}

// =============================================================================
// Array Access
// =============================================================================

/// Open the array stored at `key` under `root`.
///
/// A key with no array metadata is reported as not found.
pub async fn open_array(root: &StoreRoot, key: &str) -> Result<PixelArray, PixelsError> {
    let node_path = root.node_path(key);
    match Array::async_open(root.store(), &node_path).await {
        Ok(array) => Ok(array),
        Err(ArrayCreateError::MissingMetadata) => {
            debug!(path = %root.display_path(key), "No array at path");
            Err(PixelsError::NotFound(root.display_path(key)))
        }
        Err(e) => {
            warn!(
                path = %root.display_path(key),
                error_type = "array_open",
                "Failed to open array: {}",
                e
            );
            Err(IoError::Storage(format!("{}: {}", root.display_path(key), e)).into())
        }
    }
}

/// Reject arrays that are not (t, c, z, y, x).
pub fn check_dimensionality(array: &PixelArray) -> Result<(), RegionError> {
    let dims = array.dimensionality();
    if dims != AXIS_COUNT {
        return Err(RegionError::Dimensionality(dims));
    }
    Ok(())
}

/// Chunk shape of the array, taken from its first chunk.
pub fn chunk_shape(array: &PixelArray) -> Result<Vec<u64>, PixelsError> {
    let origin = vec![0u64; array.dimensionality()];
    let shape = array
        .chunk_shape(&origin)
        .map_err(|e| IoError::Storage(e.to_string()))?;
    Ok(shape.iter().map(|d| d.get()).collect())
}

// =============================================================================
// Extraction
// =============================================================================

/// Read `selection` (or the whole array for `None`) as big-endian bytes.
///
/// The array must be 5-D and hold an integer encoding. The selection is
/// bounds-checked before any chunk is fetched. Tile size policy is the
/// caller's concern.
pub async fn read_region(
    array: &PixelArray,
    selection: Option<&RegionSelection>,
) -> Result<PixelData, PixelsError> {
    check_dimensionality(array)?;

    let pixel_type = PixelType::from_data_type(array.data_type())?;
    if !pixel_type.is_extractable() {
        return Err(unextractable(pixel_type));
    }

    let subset = match selection {
        Some(sel) => {
            sel.check_bounds(array.shape())?;
            debug!(
                path = %array.path(),
                selection = %sel,
                elements = sel.element_count(),
                "Reading region"
            );
            ArraySubset::new_with_start_shape(sel.offset.to_vec(), sel.shape.to_vec())
                .map_err(|e| PixelsError::InvalidArgument(e.to_string()))?
        }
        None => ArraySubset::new_with_shape(array.shape().to_vec()),
    };

    let data = match pixel_type {
        PixelType::UInt8 => Bytes::from(retrieve::<u8>(array, &subset).await?),
        PixelType::Int8 => encode(retrieve::<i8>(array, &subset).await?, 1, |b, v| b.put_i8(v)),
        PixelType::UInt16 => encode(retrieve::<u16>(array, &subset).await?, 2, |b, v| b.put_u16(v)),
        PixelType::Int16 => encode(retrieve::<i16>(array, &subset).await?, 2, |b, v| b.put_i16(v)),
        PixelType::UInt32 => encode(retrieve::<u32>(array, &subset).await?, 4, |b, v| b.put_u32(v)),
        PixelType::Int32 => encode(retrieve::<i32>(array, &subset).await?, 4, |b, v| b.put_i32(v)),
        PixelType::Int64 => encode(retrieve::<i64>(array, &subset).await?, 8, |b, v| b.put_i64(v)),
        PixelType::Float32 | PixelType::Float64 => return Err(unextractable(pixel_type)),
    };

    Ok(PixelData { pixel_type, data })
}

fn unextractable(pixel_type: PixelType) -> PixelsError {
    PixelsError::UnsupportedType(format!(
        "{} arrays cannot be read as bytes",
        pixel_type.name()
    ))
}

async fn retrieve<T>(array: &PixelArray, subset: &ArraySubset) -> Result<Vec<T>, PixelsError>
where
    T: zarrs::array::ElementOwned + Send + Sync,
{
    array
        .async_retrieve_array_subset_elements::<T>(subset)
        .await
        .map_err(|e: ArrayError| {
            warn!(
                path = %array.path(),
                error_type = "array_read",
                "Failed to read array subset: {}",
                e
            );
            IoError::Storage(e.to_string()).into()
        })
}

/// Serialize elements with a big-endian writer.
fn encode<T: Copy>(values: Vec<T>, width: usize, put: impl Fn(&mut BytesMut, T)) -> Bytes {
    let mut buf = BytesMut::with_capacity(values.len() * width);
    for v in values {
        put(&mut buf, v);
    }
    buf.freeze()
}
