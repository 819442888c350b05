//! Numeric pixel encodings.
//!
//! Every encoding has a short code (`u1`, `i2`, `f4`, ...) and a
//! descriptive name (`uint8`, `int16`, `float32`, ...). The code is what
//! host object models store; the name is what metadata responses report.

use std::fmt;
use std::str::FromStr;

use zarrs::array::DataType;

use crate::error::PixelsError;

// =============================================================================
// Pixel Types
// =============================================================================

/// Numeric encodings recognized by the pixel access layer.
///
/// Byte extraction supports every integer encoding. The floating point
/// encodings are recognized for naming and metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// Signed 8-bit integer
    Int8,

    /// Unsigned 8-bit integer
    UInt8,

    /// Signed 16-bit integer
    Int16,

    /// Unsigned 16-bit integer
    UInt16,

    /// Signed 32-bit integer
    Int32,

    /// Unsigned 32-bit integer
    UInt32,

    /// Signed 64-bit integer
    Int64,

    /// IEEE 754 single precision
    Float32,

    /// IEEE 754 double precision
    Float64,
}

impl PixelType {
    /// All recognized encodings.
    pub const ALL: [PixelType; 9] = [
        PixelType::Int8,
        PixelType::UInt8,
        PixelType::Int16,
        PixelType::UInt16,
        PixelType::Int32,
        PixelType::UInt32,
        PixelType::Int64,
        PixelType::Float32,
        PixelType::Float64,
    ];

    /// Map an array data type to a pixel type.
    ///
    /// Fails with `UnsupportedType` for data types outside the table
    /// (booleans, 64-bit unsigned, half floats, complex, strings, ...).
    pub fn from_data_type(data_type: &DataType) -> Result<Self, PixelsError> {
        match data_type {
            DataType::Int8 => Ok(PixelType::Int8),
            DataType::UInt8 => Ok(PixelType::UInt8),
            DataType::Int16 => Ok(PixelType::Int16),
            DataType::UInt16 => Ok(PixelType::UInt16),
            DataType::Int32 => Ok(PixelType::Int32),
            DataType::UInt32 => Ok(PixelType::UInt32),
            DataType::Int64 => Ok(PixelType::Int64),
            DataType::Float32 => Ok(PixelType::Float32),
            DataType::Float64 => Ok(PixelType::Float64),
            other => Err(PixelsError::UnsupportedType(format!("{:?}", other))),
        }
    }

    /// Short encoding code, e.g. `u1` or `f8`.
    pub const fn code(self) -> &'static str {
        match self {
            PixelType::Int8 => "i1",
            PixelType::UInt8 => "u1",
            PixelType::Int16 => "i2",
            PixelType::UInt16 => "u2",
            PixelType::Int32 => "i4",
            PixelType::UInt32 => "u4",
            PixelType::Int64 => "i8",
            PixelType::Float32 => "f4",
            PixelType::Float64 => "f8",
        }
    }

    /// Descriptive name, e.g. `uint8` or `float64`.
    pub const fn name(self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::UInt8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::UInt16 => "uint16",
            PixelType::Int32 => "int32",
            PixelType::UInt32 => "uint32",
            PixelType::Int64 => "int64",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }

    /// Width of one element in bytes.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Int8 | PixelType::UInt8 => 1,
            PixelType::Int16 | PixelType::UInt16 => 2,
            PixelType::Int32 | PixelType::UInt32 | PixelType::Float32 => 4,
            PixelType::Int64 | PixelType::Float64 => 8,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        !matches!(
            self,
            PixelType::UInt8 | PixelType::UInt16 | PixelType::UInt32
        )
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    /// Whether byte extraction supports this encoding.
    #[inline]
    pub const fn is_extractable(self) -> bool {
        !self.is_float()
    }

    /// Whether [`min_max`] supports this encoding.
    #[inline]
    pub const fn supports_min_max(self) -> bool {
        self.bytes_per_pixel() <= 4 && !self.is_float()
    }
}

impl FromStr for PixelType {
    type Err = PixelsError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        PixelType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| PixelsError::UnsupportedType(code.to_string()))
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptive name for an encoding code, e.g. `u2` -> `uint16`.
pub fn type_name(code: &str) -> Result<&'static str, PixelsError> {
    code.parse::<PixelType>().map(PixelType::name)
}

// =============================================================================
// Min / Max
// =============================================================================

/// Minimum and maximum over a big-endian pixel buffer.
///
/// Only 8, 16 and 32-bit integer encodings are supported. Unsigned values
/// are compared as unsigned, so a `u1` byte of `0xff` is 255.
pub fn min_max(buf: &[u8], pixel_type: PixelType) -> Result<(i64, i64), PixelsError> {
    if !pixel_type.supports_min_max() {
        return Err(PixelsError::UnsupportedType(pixel_type.code().to_string()));
    }
    if buf.is_empty() {
        return Err(PixelsError::EmptyBuffer);
    }

    let width = pixel_type.bytes_per_pixel();
    if buf.len() % width != 0 {
        return Err(PixelsError::InvalidArgument(format!(
            "buffer of {} bytes is not a whole number of {} pixels",
            buf.len(),
            pixel_type.code()
        )));
    }

    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for chunk in buf.chunks_exact(width) {
        let v = decode_be(chunk, pixel_type);
        min = min.min(v);
        max = max.max(v);
    }

    Ok((min, max))
}

fn decode_be(chunk: &[u8], pixel_type: PixelType) -> i64 {
    match pixel_type {
        PixelType::Int8 => chunk[0] as i8 as i64,
        PixelType::UInt8 => chunk[0] as i64,
        PixelType::Int16 => i16::from_be_bytes([chunk[0], chunk[1]]) as i64,
        PixelType::UInt16 => u16::from_be_bytes([chunk[0], chunk[1]]) as i64,
        PixelType::Int32 => i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64,
        PixelType::UInt32 => u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64,
        // Rejected by supports_min_max
        PixelType::Int64 | PixelType::Float32 | PixelType::Float64 => 0,
    }
}

// =============================================================================
// Tests
// =============================================================================
