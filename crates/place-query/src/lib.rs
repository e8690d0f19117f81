//! Place API query dialect
//!
//! This crate builds the structured query payloads the place API understands.
//! The API is backed by a document store, so filters are expressed in a
//! Mongo-style dialect (`$and`, `$or`, `$geoIntersects`, `$near`) serialized
//! into the request's `where` parameter.
//!
//! # Example
//!
//! ```rust
//! use place_query::{extent_intersect, QueryExpression};
//!
//! // Everything inside the current viewport, restricted to one shop type.
//! let expr = QueryExpression::and(vec![
//!     extent_intersect(2.25, 48.80, 2.45, 48.90).unwrap().into(),
//!     QueryExpression::field("code_shop", "NB_B202"),
//! ]);
//! let wire = expr.to_query_string().unwrap();
//! assert!(wire.starts_with("{\"$and\""));
//! ```

pub mod expr;
pub mod geojson;

pub use expr::{extent_intersect, near, point_intersect, QueryExpression, SpatialPredicate};
pub use geojson::{Feature, FeatureCollection, Geometry};

/// Resource name constants, used as URL path segments and in query building.
pub mod resources {
    /// Administrative statistical cells
    pub const IRIS: &str = "iris";
    /// Retail points of sale
    pub const SHOP: &str = "shop";
    /// Shop type taxonomy
    pub const SHOP_TYPE: &str = "shop_type";
    /// National product consumption figures
    pub const CONSO_NAT_PROD: &str = "conso_nat_prod";
    /// Product taxonomy
    pub const PRODUCT: &str = "product";
    /// Administrative regions
    pub const REGION: &str = "region";
    /// Road segments
    pub const ROAD: &str = "road";
    /// Transit stops
    pub const TRANSPORTATION: &str = "transportation";
    /// Territory typology
    pub const TYPE_TERRITORY: &str = "type_territory";
    /// Geographic zones
    pub const ZONE_GEOGRAPHY: &str = "zone_geography";
    /// Precomputed analysis cells
    pub const CELL_ANALYSIS: &str = "cell_analysis";
}

/// Response format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Plain JSON records.
    #[default]
    Json,
    /// GeoJSON features; the default for all geo shortcut operations.
    GeoJson,
}

impl Format {
    /// Wire value for the `format` request parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::GeoJson => "geojson",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
