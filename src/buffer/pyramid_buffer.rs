use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::PixelsError;
use crate::pixels::{PixelData, PixelProvider, PixelType};
use crate::pyramid::ImageIdentity;
use crate::region::{RegionSelection, AXIS_X, AXIS_Y};

/// Tile-addressable view of one image's resolution pyramid.
///
/// The buffer tracks a single piece of state: the current resolution
/// level. Callers see levels inverted against the on-disk numbering:
///
/// ```text
/// stored = (level_count - 1) - visible
/// ```
///
/// so visible level 0 is the last on-disk level. The transform is its own
/// inverse and is applied in both [`set_level`](Self::set_level) and
/// [`level`](Self::level). A new buffer starts at stored level
/// `level_count - 1`.
///
/// Mutators take `&mut self`; share one buffer between tasks only behind
/// the caller's own synchronization.
pub struct PyramidBuffer<P: PixelProvider> {
    provider: Arc<P>,
    image: ImageIdentity,
    level_count: usize,

    /// On-disk level used by reads
    level: usize,
}

impl<P: PixelProvider> PyramidBuffer<P> {
    /// Bind a buffer to `image`.
    ///
    /// Counts resolution levels eagerly and fails with `InvalidArgument`
    /// if the image has none.
    pub async fn open(provider: Arc<P>, image: ImageIdentity) -> Result<Self, PixelsError> {
        let level_count = provider.resolution_levels(&image).await?;
        if level_count == 0 {
            warn!(image = %image, "No resolution levels found");
            return Err(PixelsError::InvalidArgument(format!(
                "{} has no pixel data",
                image
            )));
        }

        debug!(image = %image, levels = level_count, "Opened pyramid buffer");
        Ok(Self {
            provider,
            image,
            level_count,
            level: level_count - 1,
        })
    }

    pub fn image(&self) -> &ImageIdentity {
        &self.image
    }

    /// Number of resolution levels.
    pub fn resolution_levels(&self) -> usize {
        self.level_count
    }

    /// Caller-visible current level.
    pub fn level(&self) -> usize {
        self.invert(self.level)
    }

    /// Select a caller-visible level.
    pub fn set_level(&mut self, level: usize) -> Result<(), PixelsError> {
        if level >= self.level_count {
            return Err(PixelsError::InvalidArgument(format!(
                "resolution level {} out of range 0..{}",
                level, self.level_count
            )));
        }
        self.level = self.invert(level);
        Ok(())
    }

    /// On-disk level currently used by reads.
    pub fn stored_level(&self) -> usize {
        self.level
    }

    fn invert(&self, level: usize) -> usize {
        (self.level_count - 1) - level
    }

    /// Physical path of the array at the current level.
    pub fn path(&self) -> String {
        self.image.physical_path(self.level)
    }

    // -------------------------------------------------------------------------
    // Sizes
    // -------------------------------------------------------------------------

    /// Extent of `axis` (0 = t ... 4 = x) at the current level.
    pub async fn axis_size(&self, axis: usize) -> Result<u64, PixelsError> {
        let shape = self
            .provider
            .array_shape(&self.image, self.level)
            .await
            .map_err(|e| {
                warn!(image = %self.image, level = self.level, axis = axis, "Axis size lookup failed: {}", e);
                e
            })?;

        shape.get(axis).copied().ok_or_else(|| {
            PixelsError::InvalidArgument(format!(
                "axis {} out of range for {}-D array",
                axis,
                shape.len()
            ))
        })
    }

    pub async fn size_t(&self) -> Result<u64, PixelsError> {
        self.axis_size(0).await
    }

    pub async fn size_c(&self) -> Result<u64, PixelsError> {
        self.axis_size(1).await
    }

    pub async fn size_z(&self) -> Result<u64, PixelsError> {
        self.axis_size(2).await
    }

    pub async fn size_y(&self) -> Result<u64, PixelsError> {
        self.axis_size(AXIS_Y).await
    }

    pub async fn size_x(&self) -> Result<u64, PixelsError> {
        self.axis_size(AXIS_X).await
    }

    /// `(width, height)` of the current level.
    pub async fn tile_size(&self) -> Result<(u64, u64), PixelsError> {
        Ok((self.size_x().await?, self.size_y().await?))
    }

    /// `(width, height)` of every stored level, in on-disk order.
    ///
    /// The current level is restored afterwards, also when a level fails.
    pub async fn resolution_descriptions(&mut self) -> Result<Vec<(u64, u64)>, PixelsError> {
        let saved = self.level;
        let result = self.collect_descriptions().await;
        self.level = saved;
        result
    }

    async fn collect_descriptions(&mut self) -> Result<Vec<(u64, u64)>, PixelsError> {
        let mut descriptions = Vec::with_capacity(self.level_count);
        for level in 0..self.level_count {
            self.level = level;
            descriptions.push(self.tile_size().await?);
        }
        Ok(descriptions)
    }

    // -------------------------------------------------------------------------
    // Pixel type
    // -------------------------------------------------------------------------

    pub async fn pixel_type(&self) -> Result<PixelType, PixelsError> {
        self.provider.pixel_type(&self.image, self.level).await
    }

    /// Bytes per pixel.
    pub async fn byte_width(&self) -> Result<usize, PixelsError> {
        Ok(self.pixel_type().await?.bytes_per_pixel())
    }

    pub async fn is_signed(&self) -> Result<bool, PixelsError> {
        Ok(self.pixel_type().await?.is_signed())
    }

    pub async fn is_float(&self) -> Result<bool, PixelsError> {
        Ok(self.pixel_type().await?.is_float())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Read a `w` x `h` tile at (`x`, `y`) of plane (`t`, `c`, `z`).
    #[allow(clippy::too_many_arguments)]
    pub async fn tile(
        &self,
        t: u64,
        c: u64,
        z: u64,
        x: u64,
        y: u64,
        w: u64,
        h: u64,
    ) -> Result<PixelData, PixelsError> {
        let selection = RegionSelection::tile_string(t, c, z, x, y, w, h).map_err(|e| {
            warn!(image = %self.image, x = x, y = y, w = w, h = h, "Invalid tile: {}", e);
            e
        })?;
        self.provider
            .pixel_data(&self.image, self.level, &selection)
            .await
    }

    // -------------------------------------------------------------------------
    // Host interface methods this backend does not provide
    // -------------------------------------------------------------------------

    pub fn plane(&self, _z: u64, _c: u64, _t: u64) -> Result<PixelData, PixelsError> {
        unsupported("plane")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn plane_region(
        &self,
        _x: u64,
        _y: u64,
        _w: u64,
        _h: u64,
        _z: u64,
        _c: u64,
        _t: u64,
    ) -> Result<PixelData, PixelsError> {
        unsupported("plane_region")
    }

    pub fn row(&self, _y: u64, _z: u64, _c: u64, _t: u64) -> Result<PixelData, PixelsError> {
        unsupported("row")
    }

    pub fn col(&self, _x: u64, _z: u64, _c: u64, _t: u64) -> Result<PixelData, PixelsError> {
        unsupported("col")
    }

    pub fn stack(&self, _c: u64, _t: u64) -> Result<PixelData, PixelsError> {
        unsupported("stack")
    }

    pub fn timepoint(&self, _t: u64) -> Result<PixelData, PixelsError> {
        unsupported("timepoint")
    }

    pub fn hypercube(
        &self,
        _offset: &[u64],
        _size: &[u64],
        _step: &[u64],
    ) -> Result<PixelData, PixelsError> {
        unsupported("hypercube")
    }

    pub fn region(&self, _size: u64, _offset: u64) -> Result<PixelData, PixelsError> {
        unsupported("region")
    }

    pub fn message_digest(&self) -> Result<Vec<u8>, PixelsError> {
        unsupported("message_digest")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_tile(
        &mut self,
        _buffer: &[u8],
        _t: u64,
        _c: u64,
        _z: u64,
        _x: u64,
        _y: u64,
        _w: u64,
        _h: u64,
    ) -> Result<(), PixelsError> {
        unsupported("set_tile")
    }

    pub fn set_region(&mut self, _size: u64, _offset: u64, _buffer: &[u8]) -> Result<(), PixelsError> {
        unsupported("set_region")
    }

    pub fn set_row(
        &mut self,
        _buffer: &[u8],
        _y: u64,
        _z: u64,
        _c: u64,
        _t: u64,
    ) -> Result<(), PixelsError> {
        unsupported("set_row")
    }

    pub fn set_plane(&mut self, _buffer: &[u8], _z: u64, _c: u64, _t: u64) -> Result<(), PixelsError> {
        unsupported("set_plane")
    }

    pub fn set_stack(&mut self, _buffer: &[u8], _c: u64, _t: u64) -> Result<(), PixelsError> {
        unsupported("set_stack")
    }

    pub fn set_timepoint(&mut self, _buffer: &[u8], _t: u64) -> Result<(), PixelsError> {
        unsupported("set_timepoint")
    }
}

impl<P: PixelProvider> std::fmt::Debug for PyramidBuffer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyramidBuffer")
            .field("image", &self.image)
            .field("level_count", &self.level_count)
            .field("level", &self.level)
            .finish()
    }
}

fn unsupported<T>(operation: &'static str) -> Result<T, PixelsError> {
    Err(PixelsError::Unsupported { operation })
}
