//! Physical layout of NGFF pyramids.
//!
//! ```text
//! <root>/<filesetId>.zarr/<series>/<level>                       simple image
//! <root>/<filesetId>.zarr/<row>/<col>/<series>/<level>           plate image
//! <root>/<filesetId>.zarr/<series>/labels/<uuid>/<level>         label mask
//! <root>/<filesetId>.zarr/<row>/<col>/<series>/labels/<uuid>/<level>
//! ```
//!
//! Everything here is pure path arithmetic. Keys are relative to the
//! storage root so they can be handed to a [`StoreRoot`](crate::io::StoreRoot).

use std::fmt;

/// Well position of a plate-acquired image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlateCoordinates {
    pub row: u32,
    pub column: u32,
}

impl PlateCoordinates {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Identity of one image inside an NGFF root.
///
/// Together with a resolution level this determines exactly one physical
/// array location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageIdentity {
    /// Root location: a local directory or an `s3://bucket[/prefix]` URI
    pub root: String,

    /// Fileset the image was imported from
    pub fileset_id: u64,

    /// Series (field) index within the fileset
    pub series: u32,

    /// Present only for plate images
    pub plate: Option<PlateCoordinates>,
}

impl ImageIdentity {
    /// Identity of a simple (non-plate) image.
    pub fn new(root: impl Into<String>, fileset_id: u64, series: u32) -> Self {
        Self {
            root: root.into(),
            fileset_id,
            series,
            plate: None,
        }
    }

    /// Attach plate coordinates.
    pub fn with_plate(mut self, row: u32, column: u32) -> Self {
        self.plate = Some(PlateCoordinates::new(row, column));
        self
    }

    /// Directory name of the fileset, `<filesetId>.zarr`.
    pub fn fileset_key(&self) -> String {
        format!("{}.zarr", self.fileset_id)
    }

    /// Key of the series group, the parent of all resolution levels.
    pub fn series_key(&self) -> String {
        match self.plate {
            Some(p) => format!(
                "{}/{}/{}/{}",
                self.fileset_key(),
                p.row,
                p.column,
                self.series
            ),
            None => format!("{}/{}", self.fileset_key(), self.series),
        }
    }

    /// Key of the pixel array at `level`.
    pub fn level_key(&self, level: usize) -> String {
        format!("{}/{}", self.series_key(), level)
    }

    /// Key of the label-shape group for `uuid`.
    pub fn label_group_key(&self, uuid: &str) -> String {
        format!("{}/labels/{}", self.series_key(), uuid)
    }

    /// Key of the label-mask array for `uuid` at `level`.
    pub fn label_level_key(&self, uuid: &str, level: usize) -> String {
        format!("{}/{}", self.label_group_key(uuid), level)
    }

    /// Full path of the pixel array at `level`, root included.
    pub fn physical_path(&self, level: usize) -> String {
        join_root(&self.root, &self.level_key(level))
    }

    /// Full path of the label-mask array, root included.
    pub fn label_physical_path(&self, uuid: &str, level: usize) -> String {
        join_root(&self.root, &self.label_level_key(uuid, level))
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_root(&self.root, &self.series_key()))
    }
}

fn join_root(root: &str, key: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), key)
}

/// Parse a directory name as a resolution level.
///
/// Only plain decimal names count; anything else is not a level.
pub fn parse_level_name(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Count the resolution levels among a series group's child names.
pub fn count_levels<I, S>(names: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|n| parse_level_name(n.as_ref()).is_some())
        .count()
}
