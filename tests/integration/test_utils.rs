//! Test utilities for integration tests.
//!
//! This module writes small Zarr v2 pyramids into a temporary directory:
//! plain JSON metadata and uncompressed chunk files, so tests never depend
//! on a write path of the library under test.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ngff_pixels::ImageIdentity;

// =============================================================================
// Logging
// =============================================================================

/// Route library logs to the test output. Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ngff_pixels=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// =============================================================================
// Fixture
// =============================================================================

/// A temporary NGFF root.
pub struct NgffFixture {
    dir: TempDir,
}

impl NgffFixture {
    pub fn new() -> Self {
        init_logging();
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Root string handed to the library.
    pub fn root(&self) -> String {
        self.dir.path().to_str().unwrap().to_string()
    }

    /// Identity of a simple image under this root.
    pub fn image(&self, fileset_id: u64, series: u32) -> ImageIdentity {
        ImageIdentity::new(self.root(), fileset_id, series)
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.path().join(key)
    }

    /// Create a directory without any Zarr metadata.
    pub fn mkdir(&self, key: &str) {
        fs::create_dir_all(self.path(key)).unwrap();
    }

    /// Write a Zarr v2 group, with attributes when given.
    pub fn write_group(&self, key: &str, attrs: Option<Value>) {
        let dir = self.path(key);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(".zgroup"), json!({"zarr_format": 2}).to_string()).unwrap();
        if let Some(attrs) = attrs {
            fs::write(dir.join(".zattrs"), attrs.to_string()).unwrap();
        }
    }

    /// Write a Zarr v2 array.
    ///
    /// `data` holds every element in C order, already encoded with the byte
    /// order `dtype` declares. Edge chunks are padded with zeros.
    pub fn write_array(&self, key: &str, dtype: &str, shape: &[u64], chunks: &[u64], data: &[u8]) {
        assert_eq!(shape.len(), chunks.len());
        let count: u64 = shape.iter().product();
        let width = data.len() / count as usize;
        assert_eq!(data.len(), count as usize * width);

        let dir = self.path(key);
        fs::create_dir_all(&dir).unwrap();

        let fill_value = if dtype.contains('f') { json!(0.0) } else { json!(0) };
        let zarray = json!({
            "zarr_format": 2,
            "shape": shape,
            "chunks": chunks,
            "dtype": dtype,
            "compressor": null,
            "fill_value": fill_value,
            "order": "C",
            "filters": null,
            "dimension_separator": "/"
        });
        fs::write(dir.join(".zarray"), zarray.to_string()).unwrap();

        let grid: Vec<u64> = shape
            .iter()
            .zip(chunks)
            .map(|(s, c)| s.div_ceil(*c))
            .collect();
        let chunk_len: u64 = chunks.iter().product();

        for chunk_flat in 0..grid.iter().product::<u64>() {
            let chunk_index = unravel(chunk_flat, &grid);
            let mut buf = vec![0u8; chunk_len as usize * width];

            for local_flat in 0..chunk_len {
                let local = unravel(local_flat, chunks);
                let global: Vec<u64> = chunk_index
                    .iter()
                    .zip(chunks)
                    .zip(&local)
                    .map(|((ci, c), l)| ci * c + l)
                    .collect();
                if global.iter().zip(shape).any(|(g, s)| g >= s) {
                    continue;
                }
                let src = ravel(&global, shape) as usize * width;
                let dst = local_flat as usize * width;
                buf[dst..dst + width].copy_from_slice(&data[src..src + width]);
            }

            let chunk_key: Vec<String> = chunk_index.iter().map(u64::to_string).collect();
            let chunk_path = dir.join(chunk_key.join("/"));
            fs::create_dir_all(chunk_path.parent().unwrap()).unwrap();
            fs::write(chunk_path, buf).unwrap();
        }
    }
}

fn unravel(mut flat: u64, dims: &[u64]) -> Vec<u64> {
    let mut index = vec![0; dims.len()];
    for axis in (0..dims.len()).rev() {
        index[axis] = flat % dims[axis];
        flat /= dims[axis];
    }
    index
}

fn ravel(index: &[u64], dims: &[u64]) -> u64 {
    index
        .iter()
        .zip(dims)
        .fold(0, |acc, (i, d)| acc * d + i)
}

// =============================================================================
// Pixel Patterns
// =============================================================================

/// Deterministic value for a (t, c, z, y, x) position.
pub fn pattern(t: u64, c: u64, z: u64, y: u64, x: u64) -> u64 {
    t * 1_000_003 + c * 10_007 + z * 101 + y * 7 + x * 3
}

/// Every position of `shape` in C order.
pub fn positions(shape: [u64; 5]) -> Vec<[u64; 5]> {
    let count: u64 = shape.iter().product();
    (0..count)
        .map(|flat| {
            let i = unravel(flat, &shape);
            [i[0], i[1], i[2], i[3], i[4]]
        })
        .collect()
}

/// u8 pixels following [`pattern`].
pub fn u8_pixels(shape: [u64; 5]) -> Vec<u8> {
    positions(shape)
        .into_iter()
        .map(|[t, c, z, y, x]| (pattern(t, c, z, y, x) % 256) as u8)
        .collect()
}

/// u16 values following [`pattern`].
pub fn u16_values(shape: [u64; 5]) -> Vec<u16> {
    positions(shape)
        .into_iter()
        .map(|[t, c, z, y, x]| (pattern(t, c, z, y, x) % 65536) as u16)
        .collect()
}

pub fn le_bytes_u16(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn be_bytes_u16(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Elements of a C-order array of `shape` that fall inside the region.
pub fn crop<T: Copy>(values: &[T], shape: [u64; 5], offset: [u64; 5], size: [u64; 5]) -> Vec<T> {
    positions(size)
        .into_iter()
        .map(|local| {
            let global: Vec<u64> = local.iter().zip(&offset).map(|(l, o)| l + o).collect();
            values[ravel(&global, &shape) as usize]
        })
        .collect()
}

/// A standard multiscales descriptor for `levels` datasets.
pub fn multiscales(levels: usize) -> Value {
    let datasets: Vec<Value> = (0..levels)
        .map(|l| json!({"path": l.to_string()}))
        .collect();
    json!({
        "version": "0.4",
        "axes": ["t", "c", "z", "y", "x"],
        "datasets": datasets
    })
}

/// Write a u8 image `7.zarr/0` with levels 0 and 1, as most tests use.
///
/// Level 0 is 1x2x1x200x300 in 64x64 chunks, level 1 is 1x2x1x100x150.
pub fn two_level_u8_image(fixture: &NgffFixture, attrs: Option<Value>) -> (Vec<u8>, [u64; 5]) {
    let shape0 = [1, 2, 1, 200, 300];
    let shape1 = [1, 2, 1, 100, 150];
    let level0 = u8_pixels(shape0);

    fixture.write_group("7.zarr", None);
    fixture.write_group("7.zarr/0", attrs);
    fixture.write_array("7.zarr/0/0", "|u1", &shape0, &[1, 1, 1, 64, 64], &level0);
    fixture.write_array("7.zarr/0/1", "|u1", &shape1, &[1, 1, 1, 64, 64], &u8_pixels(shape1));

    (level0, shape0)
}
