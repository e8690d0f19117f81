//! GeoJSON response types.
//!
//! The service returns GeoJSON when `format=geojson` is requested, which is
//! the default for every geo shortcut operation. Feature properties are left
//! as open JSON maps; each resource carries its own attribute schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Array of features.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Add a feature to the collection.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A single GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Optional feature identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// The feature's geometry.
    pub geometry: Geometry,

    /// Attribute map; schema depends on the resource.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Create a feature with a point geometry and no properties.
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry: Geometry::Point {
                coordinates: [x, y],
            },
            properties: Map::new(),
        }
    }

    /// Set a property value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Read a numeric property, if present and numeric.
    pub fn number_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }
}

/// Geometry types the service returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A point as [longitude, latitude].
    Point { coordinates: [f64; 2] },

    /// A polyline as [lon, lat] pairs.
    LineString { coordinates: Vec<[f64; 2]> },

    /// A polygon as linear rings; the first ring is the exterior.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },

    /// Multiple polygons.
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}
