//! Region selection parsing and validation.
//!
//! Parsing is kept separate from policy: [`RegionSelection::parse`] only
//! decodes the wire format, and callers apply
//! [`check_tile_size`](RegionSelection::check_tile_size) and
//! [`check_bounds`](RegionSelection::check_bounds) before reading.

mod selector;

pub use selector::{RegionSelection, AXIS_COUNT, AXIS_X, AXIS_Y};
