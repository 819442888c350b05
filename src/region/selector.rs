use std::fmt;

use crate::error::RegionError;

/// Number of axes in every pixel array: (t, c, z, y, x).
pub const AXIS_COUNT: usize = 5;

/// Axis index of y in a (t, c, z, y, x) shape.
pub const AXIS_Y: usize = 3;

/// Axis index of x in a (t, c, z, y, x) shape.
pub const AXIS_X: usize = 4;

/// A 5-D sub-region over (t, c, z, y, x).
///
/// Produced from the region selection wire format:
///
/// ```text
/// [t, c, z, y0:y1, x0:x1]
/// ```
///
/// A literal term selects one index (shape 1). A `start:end` term is
/// half-open (shape `end - start`, offset `start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionSelection {
    pub shape: [u64; AXIS_COUNT],
    pub offset: [u64; AXIS_COUNT],
}

impl RegionSelection {
    pub fn new(shape: [u64; AXIS_COUNT], offset: [u64; AXIS_COUNT]) -> Self {
        Self { shape, offset }
    }

    /// Parse a selection string.
    ///
    /// Returns `Ok(None)` for the empty string, meaning "the whole array".
    /// One leading `[` and one trailing `]` are stripped when present.
    pub fn parse(selection: &str) -> Result<Option<Self>, RegionError> {
        if selection.is_empty() {
            return Ok(None);
        }

        let inner = selection.strip_prefix('[').unwrap_or(selection);
        let inner = inner.strip_suffix(']').unwrap_or(inner);

        let terms: Vec<&str> = inner.split(',').collect();
        if terms.len() != AXIS_COUNT {
            return Err(RegionError::TermCount(terms.len()));
        }

        let mut shape = [0u64; AXIS_COUNT];
        let mut offset = [0u64; AXIS_COUNT];
        for (i, term) in terms.iter().enumerate() {
            let (size, start) = parse_term(term.trim())?;
            shape[i] = size;
            offset[i] = start;
        }

        Ok(Some(Self { shape, offset }))
    }

    /// Selection string `[t,c,z,y:y+h,x:x+w]` for one (y, x) tile.
    pub fn tile_string(
        t: u64,
        c: u64,
        z: u64,
        x: u64,
        y: u64,
        w: u64,
        h: u64,
    ) -> Result<String, RegionError> {
        let tile = Self::tile(t, c, z, x, y, w, h)?;
        Ok(format!(
            "[{},{},{},{}:{},{}:{}]",
            t,
            c,
            z,
            y,
            tile.end(AXIS_Y),
            x,
            tile.end(AXIS_X)
        ))
    }

    /// Selection for one (y, x) tile at fixed (t, c, z).
    ///
    /// Fails if the tile end does not fit in a `u64`.
    pub fn tile(
        t: u64,
        c: u64,
        z: u64,
        x: u64,
        y: u64,
        w: u64,
        h: u64,
    ) -> Result<Self, RegionError> {
        if y.checked_add(h).is_none() || x.checked_add(w).is_none() {
            return Err(RegionError::InvalidRange(format!(
                "tile at x={}, y={} of {}x{} overflows",
                x, y, w, h
            )));
        }
        Ok(Self {
            shape: [1, 1, 1, h, w],
            offset: [t, c, z, y, x],
        })
    }

    /// Exclusive end of the selection on `axis`.
    fn end(&self, axis: usize) -> u64 {
        self.offset[axis].saturating_add(self.shape[axis])
    }

    /// Selection covering a whole (y, x) plane of an array with `shape`.
    pub fn plane(shape: &[u64], t: u64, c: u64, z: u64) -> Result<Self, RegionError> {
        if shape.len() != AXIS_COUNT {
            return Err(RegionError::Dimensionality(shape.len()));
        }
        Ok(Self {
            shape: [1, 1, 1, shape[AXIS_Y], shape[AXIS_X]],
            offset: [t, c, z, 0, 0],
        })
    }

    /// Tile width (x extent).
    pub fn width(&self) -> u64 {
        self.shape[AXIS_X]
    }

    /// Tile height (y extent).
    pub fn height(&self) -> u64 {
        self.shape[AXIS_Y]
    }

    /// Number of elements selected.
    pub fn element_count(&self) -> u64 {
        self.shape.iter().fold(1u64, |acc, d| acc.saturating_mul(*d))
    }

    /// Reject selections whose (y, x) extent exceeds `max` on either axis.
    pub fn check_tile_size(&self, max: u64) -> Result<(), RegionError> {
        if self.height() > max || self.width() > max {
            return Err(RegionError::TileTooLarge {
                width: self.width(),
                height: self.height(),
                max,
            });
        }
        Ok(())
    }

    /// Reject selections that do not fit inside an array of `array_shape`.
    pub fn check_bounds(&self, array_shape: &[u64]) -> Result<(), RegionError> {
        if array_shape.len() != AXIS_COUNT {
            return Err(RegionError::Dimensionality(array_shape.len()));
        }

        for axis in 0..AXIS_COUNT {
            let (start, size, extent) = (self.offset[axis], self.shape[axis], array_shape[axis]);
            let end = start.checked_add(size);
            if end.map_or(true, |end| end > extent) {
                return Err(RegionError::OutOfBounds {
                    axis,
                    start,
                    size,
                    extent,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for axis in 0..AXIS_COUNT {
            if axis > 0 {
                write!(f, ",")?;
            }
            if self.shape[axis] == 1 {
                write!(f, "{}", self.offset[axis])?;
            } else {
                write!(f, "{}:{}", self.offset[axis], self.end(axis))?;
            }
        }
        write!(f, "]")
    }
}

/// Parse one axis term into (shape, offset).
fn parse_term(term: &str) -> Result<(u64, u64), RegionError> {
    if !term.contains(':') {
        return Ok((1, parse_index(term)?));
    }

    let mut parts = term.split(':');
    let (start, end) = match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => (parse_index(start)?, parse_index(end)?),
        _ => return Err(RegionError::InvalidRange(term.to_string())),
    };

    if end < start {
        return Err(RegionError::InvalidRange(term.to_string()));
    }
    Ok((end - start, start))
}

fn parse_index(s: &str) -> Result<u64, RegionError> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| RegionError::InvalidNumber(s.to_string()))
}
