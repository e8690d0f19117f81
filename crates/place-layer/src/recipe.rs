//! Per-resource refresh query recipes.
//!
//! Each rendered layer carries one recipe describing how a viewport turns
//! into a fetch. Recipes are plain data rather than rebound callbacks, so a
//! layer's behavior is inspectable and testable without a map.

use place_client::ResourceClient;
use place_common::PlaceResult;
use place_query::FeatureCollection;

use crate::viewport::Viewport;

/// Lowest analysis-cell level the service precomputes.
pub const CELL_LEVEL_MIN: u32 = 14;

/// Highest analysis-cell level the service precomputes.
pub const CELL_LEVEL_MAX: u32 = 18;

/// How a layer's features are fetched for a viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshQuery {
    /// Fetch every feature of a resource intersecting the viewport extent.
    Extent { resource: String },

    /// Fetch analysis cells intersecting the viewport extent at the
    /// viewport's zoom, clamped into the precomputed level range. Levels
    /// outside the range are clamped to the nearest one, never rejected.
    CellAnalysis { min_level: u32, max_level: u32 },
}

impl RefreshQuery {
    /// Extent recipe for a named resource.
    pub fn extent(resource: impl Into<String>) -> Self {
        RefreshQuery::Extent {
            resource: resource.into(),
        }
    }

    /// Analysis-cell recipe over the service's precomputed level range.
    pub fn cell_analysis() -> Self {
        RefreshQuery::CellAnalysis {
            min_level: CELL_LEVEL_MIN,
            max_level: CELL_LEVEL_MAX,
        }
    }

    /// The analysis level requested for a viewport zoom.
    pub fn level_for(&self, zoom: u32) -> Option<u32> {
        match self {
            RefreshQuery::Extent { .. } => None,
            RefreshQuery::CellAnalysis {
                min_level,
                max_level,
            } => Some(zoom.clamp(*min_level, *max_level)),
        }
    }

    /// Run the recipe's fetch for a viewport.
    pub async fn execute(
        &self,
        client: &ResourceClient,
        viewport: &Viewport,
    ) -> PlaceResult<FeatureCollection> {
        match self {
            RefreshQuery::Extent { resource } => {
                client.fetch_in_extent(resource, &viewport.bounds).await
            }
            RefreshQuery::CellAnalysis { .. } => {
                let level = self
                    .level_for(viewport.zoom)
                    .expect("cell analysis recipe always has a level");
                client.fetch_cells_in_extent(&viewport.bounds, level).await
            }
        }
    }
}
