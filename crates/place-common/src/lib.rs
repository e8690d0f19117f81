//! Common types and utilities shared across all placemap crates.

pub mod bbox;
pub mod error;
pub mod symbology;
pub mod tile;

pub use bbox::{BoundingBox, Point};
pub use error::{PlaceError, PlaceResult};
pub use symbology::{indicator_field, resolve_color, Color, ColorRamp};
pub use tile::{extent_to_tile_range, lonlat_to_tile, tile_bbox, TileCoord};
