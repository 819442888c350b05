//! Logical image identities and their physical pyramid layout.

mod path;

pub use path::{count_levels, parse_level_name, ImageIdentity, PlateCoordinates};
