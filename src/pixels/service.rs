//! Pixels Service for region and tile reads.
//!
//! The PixelsService is the host-facing read API. It orchestrates:
//! - Root resolution through the storage locator
//! - Path composition from an image identity
//! - Region parsing and the tile size policy
//! - Typed byte extraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         PixelsService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    pixel_data()                         │    │
//! │  │  1. Parse selection    4. Open array at level key       │    │
//! │  │  2. Check tile size    5. Read + big-endian encode      │    │
//! │  │  3. Locate root                                         │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │            │
//! │           ▼                    ▼                    ▼            │
//! │  ┌────────────────┐   ┌───────────────┐   ┌─────────────────┐   │
//! │  │ StorageLocator │   │ ImageIdentity │   │    extractor    │   │
//! │  └────────────────┘   └───────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::PixelsConfig;
use crate::error::PixelsError;
use crate::io::{StorageLocator, StoreRoot};
use crate::pyramid::{count_levels, ImageIdentity};
use crate::region::{RegionSelection, AXIS_X, AXIS_Y};

use super::extractor::{check_dimensionality, open_array, read_region, PixelArray, PixelData};
use super::pixel_type::{min_max, PixelType};

// =============================================================================
// Provider Trait
// =============================================================================

/// Read operations a [`PyramidBuffer`](crate::buffer::PyramidBuffer) needs.
///
/// Implemented by [`PixelsService`]; tests substitute in-memory providers.
#[async_trait]
pub trait PixelProvider: Send + Sync {
    /// Number of resolution levels stored for the image.
    async fn resolution_levels(&self, image: &ImageIdentity) -> Result<usize, PixelsError>;

    /// Full (t, c, z, y, x) shape of the array at `level`.
    async fn array_shape(&self, image: &ImageIdentity, level: usize)
        -> Result<Vec<u64>, PixelsError>;

    /// Numeric encoding of the array at `level`.
    async fn pixel_type(&self, image: &ImageIdentity, level: usize)
        -> Result<PixelType, PixelsError>;

    /// Bytes of `selection` at `level`. An empty selection reads the whole array.
    async fn pixel_data(
        &self,
        image: &ImageIdentity,
        level: usize,
        selection: &str,
    ) -> Result<PixelData, PixelsError>;
}

// =============================================================================
// Pixels Service
// =============================================================================

/// Stateless read service over NGFF pyramids.
///
/// Every call locates the root, opens the array it needs, reads and drops
/// it. Nothing is cached, so one service can be shared freely between
/// tasks.
///
/// # Example
///
/// ```ignore
/// let service = PixelsService::from_config(&config)?;
/// let image = ImageIdentity::new("/data/ngff", 7, 0);
///
/// let tile = service.pixel_data(&image, 0, "[0,0,0,100:150,200:260]").await?;
/// assert_eq!(tile.data.len(), 50 * 60 * tile.pixel_type.bytes_per_pixel());
/// ```
#[derive(Debug, Clone)]
pub struct PixelsService {
    locator: StorageLocator,
    max_tile_length: u64,
}

impl PixelsService {
    pub fn new(locator: StorageLocator, max_tile_length: u64) -> Self {
        Self {
            locator,
            max_tile_length,
        }
    }

    /// Build a service from validated process configuration.
    pub fn from_config(config: &PixelsConfig) -> Result<Self, PixelsError> {
        config.validate().map_err(PixelsError::Configuration)?;
        Ok(Self::new(
            StorageLocator::from_config(config),
            config.max_tile_length,
        ))
    }

    pub fn locator(&self) -> &StorageLocator {
        &self.locator
    }

    /// Largest accepted tile width or height.
    pub fn max_tile_length(&self) -> u64 {
        self.max_tile_length
    }

    fn locate(&self, image: &ImageIdentity) -> Result<StoreRoot, PixelsError> {
        self.locator.locate(&image.root)
    }

    async fn open_level(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<PixelArray, PixelsError> {
        let root = self.locate(image)?;
        open_array(&root, &image.level_key(level)).await
    }

    /// Parse a selection and apply the tile size policy.
    fn parse_selection(
        &self,
        image: &ImageIdentity,
        selection: &str,
    ) -> Result<Option<RegionSelection>, PixelsError> {
        let parsed = RegionSelection::parse(selection).map_err(|e| {
            warn!(image = %image, selection = selection, "Invalid region selection: {}", e);
            e
        })?;

        if let Some(sel) = &parsed {
            sel.check_tile_size(self.max_tile_length).map_err(|e| {
                warn!(image = %image, selection = %sel, "Rejected tile: {}", e);
                e
            })?;
        }

        Ok(parsed)
    }

    // -------------------------------------------------------------------------
    // Resolution levels and sizes
    // -------------------------------------------------------------------------

    /// Count numerically named children of the series group.
    ///
    /// A series with no child directories at all, including one under a
    /// root that does not exist, is reported as not found.
    pub async fn resolution_levels(&self, image: &ImageIdentity) -> Result<usize, PixelsError> {
        let root = self.locate(image)?;
        let names = root.child_names(&image.series_key()).await.map_err(|e| {
            warn!(image = %image, "Failed to list resolution levels: {}", e);
            e
        })?;

        if names.is_empty() {
            debug!(image = %image, "Nothing stored under series");
            return Err(PixelsError::NotFound(root.display_path(&image.series_key())));
        }

        let count = count_levels(&names);
        debug!(image = %image, levels = count, "Counted resolution levels");
        Ok(count)
    }

    /// Full array shape at `level`.
    pub async fn array_shape(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<Vec<u64>, PixelsError> {
        let array = self.open_level(image, level).await?;
        Ok(array.shape().to_vec())
    }

    /// Size of one axis at `level`.
    pub async fn dim_size(
        &self,
        image: &ImageIdentity,
        level: usize,
        axis: usize,
    ) -> Result<u64, PixelsError> {
        let shape = self.array_shape(image, level).await?;
        shape.get(axis).copied().ok_or_else(|| {
            PixelsError::InvalidArgument(format!(
                "axis {} out of range for {}-D array",
                axis,
                shape.len()
            ))
        })
    }

    /// `(x, y)` size at `level`.
    pub async fn size_xy(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<(u64, u64), PixelsError> {
        let array = self.open_level(image, level).await?;
        check_dimensionality(&array)?;
        let shape = array.shape();
        Ok((shape[AXIS_X], shape[AXIS_Y]))
    }

    /// `(width, height)` of every level, in on-disk order.
    pub async fn resolution_descriptions(
        &self,
        image: &ImageIdentity,
    ) -> Result<Vec<(u64, u64)>, PixelsError> {
        let levels = self.resolution_levels(image).await?;
        let mut descriptions = Vec::with_capacity(levels);
        for level in 0..levels {
            descriptions.push(self.size_xy(image, level).await?);
        }
        Ok(descriptions)
    }

    /// Numeric encoding of the array at `level`.
    pub async fn pixel_type(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<PixelType, PixelsError> {
        let array = self.open_level(image, level).await?;
        PixelType::from_data_type(array.data_type())
    }

    // -------------------------------------------------------------------------
    // Pixel reads
    // -------------------------------------------------------------------------

    /// Read a region of the image at `level`.
    ///
    /// `selection` uses the `[t,c,z,y0:y1,x0:x1]` wire format. The empty
    /// string reads the whole array and skips the tile size check.
    ///
    /// # Errors
    ///
    /// - `Region` for malformed selections, tiles over the size limit,
    ///   out-of-bounds regions, or arrays that are not 5-D
    /// - `UnsupportedType` for floating point arrays
    /// - `NotFound` if the level does not exist
    pub async fn pixel_data(
        &self,
        image: &ImageIdentity,
        level: usize,
        selection: &str,
    ) -> Result<PixelData, PixelsError> {
        let parsed = self.parse_selection(image, selection)?;
        let array = self.open_level(image, level).await?;

        read_region(&array, parsed.as_ref()).await.map_err(|e| {
            warn!(image = %image, level = level, selection = selection, "Pixel read failed: {}", e);
            e
        })
    }

    /// Read a region of a label mask.
    pub async fn label_bytes(
        &self,
        image: &ImageIdentity,
        uuid: &str,
        level: usize,
        selection: &str,
    ) -> Result<PixelData, PixelsError> {
        let parsed = self.parse_selection(image, selection)?;
        let root = self.locate(image)?;
        let array = open_array(&root, &image.label_level_key(uuid, level)).await?;

        read_region(&array, parsed.as_ref()).await.map_err(|e| {
            warn!(image = %image, label = uuid, level = level, "Label read failed: {}", e);
            e
        })
    }

    /// Min and max over one whole (y, x) plane.
    pub async fn plane_min_max(
        &self,
        image: &ImageIdentity,
        level: usize,
        t: u64,
        c: u64,
        z: u64,
    ) -> Result<(i64, i64), PixelsError> {
        let array = self.open_level(image, level).await?;
        let plane = RegionSelection::plane(array.shape(), t, c, z)?;
        let pixels = read_region(&array, Some(&plane)).await?;
        min_max(&pixels.data, pixels.pixel_type)
    }
}

#[async_trait]
impl PixelProvider for PixelsService {
    async fn resolution_levels(&self, image: &ImageIdentity) -> Result<usize, PixelsError> {
        PixelsService::resolution_levels(self, image).await
    }

    async fn array_shape(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<Vec<u64>, PixelsError> {
        PixelsService::array_shape(self, image, level).await
    }

    async fn pixel_type(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<PixelType, PixelsError> {
        PixelsService::pixel_type(self, image, level).await
    }

    async fn pixel_data(
        &self,
        image: &ImageIdentity,
        level: usize,
        selection: &str,
    ) -> Result<PixelData, PixelsError> {
        PixelsService::pixel_data(self, image, level, selection).await
    }
}
