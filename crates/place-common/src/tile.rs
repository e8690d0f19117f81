//! Slippy-map tile coordinate math.
//!
//! Converts geographic extents to Web Mercator (XYZ) tile indices. Used by
//! tiled-fetch strategies; standalone otherwise.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{PlaceError, PlaceResult};

/// Highest zoom level the tile grid supports.
pub const MAX_TILE_ZOOM: u32 = 22;

/// Latitude bound of the Web Mercator projection, in degrees.
const MERCATOR_LAT_LIMIT: f64 = 85.05112878;

/// A tile coordinate (x/y/z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    /// Zoom level
    pub z: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Convert a lon/lat coordinate to the tile containing it at the given zoom.
///
/// Latitude is clamped to the Mercator domain and the resulting indices are
/// clamped into `[0, 2^z - 1]`, so poles and the antimeridian map to edge
/// tiles instead of overflowing the grid.
pub fn lonlat_to_tile(lon: f64, lat: f64, zoom: u32) -> TileCoord {
    let n = 2u32.pow(zoom) as f64;
    let lat = lat.clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT);

    let x = ((lon + 180.0) / 360.0 * n).floor();
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n).floor();

    let max_index = (n - 1.0).max(0.0);
    TileCoord {
        x: x.clamp(0.0, max_index) as u32,
        y: y.clamp(0.0, max_index) as u32,
        z: zoom,
    }
}

/// Convert a tile coordinate back to its lon/lat bounds.
pub fn tile_bbox(coord: &TileCoord) -> BoundingBox {
    let n = 2u32.pow(coord.z) as f64;

    let lon_min = coord.x as f64 / n * 360.0 - 180.0;
    let lon_max = (coord.x + 1) as f64 / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y + 1) as f64 / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox {
        xmin: lon_min,
        ymin: lat_min,
        xmax: lon_max,
        ymax: lat_max,
    }
}

/// Enumerate the tiles covering an extent at the given zoom.
///
/// Walks the grid from the extent's top-left tile to its bottom-right tile,
/// row-major. The whole-world extent at zoom 0 yields exactly `[{0,0,0}]`.
pub fn extent_to_tile_range(bbox: &BoundingBox, zoom: u32) -> PlaceResult<Vec<TileCoord>> {
    if zoom > MAX_TILE_ZOOM {
        return Err(PlaceError::InvalidArgument(format!(
            "zoom {} exceeds maximum tile zoom {}",
            zoom, MAX_TILE_ZOOM
        )));
    }

    let top_left = lonlat_to_tile(bbox.xmin, bbox.ymax, zoom);
    let bottom_right = lonlat_to_tile(bbox.xmax, bbox.ymin, zoom);

    let mut tiles =
        Vec::with_capacity(((bottom_right.x - top_left.x + 1) * (bottom_right.y - top_left.y + 1)) as usize);
    for x in top_left.x..=bottom_right.x {
        for y in top_left.y..=bottom_right.y {
            tiles.push(TileCoord { x, y, z: zoom });
        }
    }
    Ok(tiles)
}
