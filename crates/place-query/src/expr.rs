//! Spatial predicates and composable query expressions.
//!
//! All constructors are pure and fail fast with `InvalidArgument` on
//! malformed numeric input. Serialization preserves the order of `$and` /
//! `$or` children; the service treats the order as insignificant but the
//! wire form is deterministic.

use place_common::{BoundingBox, PlaceError, PlaceResult, Point};
use serde_json::{json, Value};

/// Default minimum search distance for `near`, in meters.
pub const DEFAULT_NEAR_MIN_DISTANCE: f64 = 0.0;

/// Default maximum search distance for `near`, in meters.
pub const DEFAULT_NEAR_MAX_DISTANCE: f64 = 500.0;

/// Document field holding each resource's geometry.
const GEOMETRY_FIELD: &str = "geometry";

/// A spatial filter on a resource's geometry field.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialPredicate {
    /// Geometries intersecting a rectangular extent, carried as a closed
    /// 5-point polygon ring (first point repeated last).
    IntersectsExtent { ring: Vec<[f64; 2]> },

    /// Geometries intersecting a single point.
    IntersectsPoint(Point),

    /// Geometries within a distance band around a point, meters.
    Near {
        point: Point,
        min_distance: f64,
        max_distance: f64,
    },
}

/// Build an extent-intersection predicate from corner coordinates.
///
/// The ring walks (xmin,ymin) → (xmax,ymin) → (xmax,ymax) → (xmin,ymax) and
/// closes back on the first point. Winding is not normalized; the service
/// accepts either orientation.
pub fn extent_intersect(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> PlaceResult<SpatialPredicate> {
    let bbox = BoundingBox::new(xmin, ymin, xmax, ymax)?;
    let ring = vec![
        [bbox.xmin, bbox.ymin],
        [bbox.xmax, bbox.ymin],
        [bbox.xmax, bbox.ymax],
        [bbox.xmin, bbox.ymax],
        [bbox.xmin, bbox.ymin],
    ];
    Ok(SpatialPredicate::IntersectsExtent { ring })
}

/// Build a point-intersection predicate.
pub fn point_intersect(x: f64, y: f64) -> PlaceResult<SpatialPredicate> {
    Ok(SpatialPredicate::IntersectsPoint(Point::new(x, y)?))
}

/// Build a proximity predicate around a point, distances in meters.
///
/// A `0.0` distance selects the defaults (0 m minimum, 500 m maximum).
/// This reproduces the service's historical behavior, where an explicit
/// zero maximum is indistinguishable from "unset" and silently becomes
/// 500 m — almost certainly a latent defect, preserved here because
/// deployed callers rely on `near(x, y, 0.0, 0.0)` meaning the default
/// band. Negative or non-finite distances are rejected.
pub fn near(x: f64, y: f64, min_distance: f64, max_distance: f64) -> PlaceResult<SpatialPredicate> {
    let point = Point::new(x, y)?;
    for (name, d) in [("min_distance", min_distance), ("max_distance", max_distance)] {
        if !d.is_finite() || d < 0.0 {
            return Err(PlaceError::InvalidArgument(format!(
                "{} must be a non-negative finite distance, got {}",
                name, d
            )));
        }
    }

    let min_distance = if min_distance == 0.0 {
        DEFAULT_NEAR_MIN_DISTANCE
    } else {
        min_distance
    };
    let max_distance = if max_distance == 0.0 {
        DEFAULT_NEAR_MAX_DISTANCE
    } else {
        max_distance
    };

    Ok(SpatialPredicate::Near {
        point,
        min_distance,
        max_distance,
    })
}

/// A composable filter expression in the service's query dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpression {
    /// A spatial predicate on the geometry field.
    Spatial(SpatialPredicate),

    /// Equality on an arbitrary document field.
    Field { name: String, value: Value },

    /// All children must match. Order preserved on the wire.
    And(Vec<QueryExpression>),

    /// Any child must match. Order preserved on the wire.
    Or(Vec<QueryExpression>),
}

impl From<SpatialPredicate> for QueryExpression {
    fn from(predicate: SpatialPredicate) -> Self {
        QueryExpression::Spatial(predicate)
    }
}

impl QueryExpression {
    /// Combine expressions under `$and`. Zero or one child is legal.
    pub fn and(children: Vec<QueryExpression>) -> Self {
        QueryExpression::And(children)
    }

    /// Combine expressions under `$or`. Zero or one child is legal.
    pub fn or(children: Vec<QueryExpression>) -> Self {
        QueryExpression::Or(children)
    }

    /// Equality filter on a document field.
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        QueryExpression::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Serialize to the service's Mongo-style filter dialect.
    pub fn to_value(&self) -> Value {
        match self {
            QueryExpression::Spatial(predicate) => spatial_to_value(predicate),
            QueryExpression::Field { name, value } => {
                let mut object = serde_json::Map::with_capacity(1);
                object.insert(name.clone(), value.clone());
                Value::Object(object)
            }
            QueryExpression::And(children) => {
                let children: Vec<Value> = children.iter().map(Self::to_value).collect();
                json!({ "$and": children })
            }
            QueryExpression::Or(children) => {
                let children: Vec<Value> = children.iter().map(Self::to_value).collect();
                json!({ "$or": children })
            }
        }
    }

    /// Serialize to the string carried in the request's `where` parameter.
    pub fn to_query_string(&self) -> PlaceResult<String> {
        serde_json::to_string(&self.to_value()).map_err(PlaceError::from)
    }
}

fn spatial_to_value(predicate: &SpatialPredicate) -> Value {
    match predicate {
        SpatialPredicate::IntersectsExtent { ring } => json!({
            (GEOMETRY_FIELD): {
                "$geoIntersects": {
                    "$geometry": {
                        "type": "Polygon",
                        "coordinates": [ring],
                    }
                }
            }
        }),
        SpatialPredicate::IntersectsPoint(point) => json!({
            (GEOMETRY_FIELD): {
                "$geoIntersects": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [point.x, point.y],
                    }
                }
            }
        }),
        SpatialPredicate::Near {
            point,
            min_distance,
            max_distance,
        } => json!({
            (GEOMETRY_FIELD): {
                "$near": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [point.x, point.y],
                    },
                    "$minDistance": min_distance,
                    "$maxDistance": max_distance,
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_ring_is_closed() {
        let predicate = extent_intersect(2.25, 48.80, 2.45, 48.90).unwrap();
        let SpatialPredicate::IntersectsExtent { ring } = &predicate else {
            panic!("expected extent predicate");
        };
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring[0], [2.25, 48.80]);
        assert_eq!(ring[2], [2.45, 48.90]);
    }

    #[test]
    fn test_extent_rejects_inverted_bounds() {
        assert!(extent_intersect(2.45, 48.80, 2.25, 48.90).is_err());
    }

    #[test]
    fn test_near_defaults() {
        let SpatialPredicate::Near {
            min_distance,
            max_distance,
            ..
        } = near(2.35, 48.85, 0.0, 0.0).unwrap()
        else {
            panic!("expected near predicate");
        };
        // Explicit zeros select the defaults, the historical quirk.
        assert_eq!(min_distance, 0.0);
        assert_eq!(max_distance, 500.0);
    }

    #[test]
    fn test_near_explicit_distances() {
        let SpatialPredicate::Near {
            min_distance,
            max_distance,
            ..
        } = near(2.35, 48.85, 10.0, 250.0).unwrap()
        else {
            panic!("expected near predicate");
        };
        assert_eq!(min_distance, 10.0);
        assert_eq!(max_distance, 250.0);
    }

    #[test]
    fn test_near_rejects_bad_distances() {
        assert!(near(2.35, 48.85, -1.0, 500.0).is_err());
        assert!(near(2.35, 48.85, 0.0, f64::NAN).is_err());
        assert!(near(f64::INFINITY, 48.85, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_extent_serialization_shape() {
        let expr: QueryExpression = extent_intersect(0.0, 0.0, 1.0, 1.0).unwrap().into();
        let value = expr.to_value();
        let geometry = &value["geometry"]["$geoIntersects"]["$geometry"];
        assert_eq!(geometry["type"], "Polygon");
        assert_eq!(geometry["coordinates"][0].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_point_serialization_shape() {
        let expr: QueryExpression = point_intersect(2.35, 48.85).unwrap().into();
        let value = expr.to_value();
        let geometry = &value["geometry"]["$geoIntersects"]["$geometry"];
        assert_eq!(geometry["type"], "Point");
        assert_eq!(geometry["coordinates"], serde_json::json!([2.35, 48.85]));
    }

    #[test]
    fn test_near_serialization_shape() {
        let expr: QueryExpression = near(2.35, 48.85, 0.0, 0.0).unwrap().into();
        let value = expr.to_value();
        let clause = &value["geometry"]["$near"];
        assert_eq!(clause["$geometry"]["type"], "Point");
        assert_eq!(clause["$geometry"]["coordinates"][0], 2.35);
        assert_eq!(clause["$minDistance"], 0.0);
        assert_eq!(clause["$maxDistance"], 500.0);
    }

    #[test]
    fn test_single_child_combinator() {
        let inner = QueryExpression::field("code_shop", "NB_B202");
        let value = QueryExpression::and(vec![inner.clone()]).to_value();
        assert_eq!(value["$and"].as_array().unwrap().len(), 1);
        assert_eq!(value["$and"][0], inner.to_value());

        let value = QueryExpression::or(vec![]).to_value();
        assert_eq!(value["$or"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_and_preserves_child_order() {
        let spatial: QueryExpression = near(2.35, 48.85, 0.0, 0.0).unwrap().into();
        let field = QueryExpression::field("code_shop", "NB_B202");
        let value = QueryExpression::and(vec![spatial.clone(), field.clone()]).to_value();

        let children = value["$and"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0]["geometry"]["$near"].is_object());
        assert_eq!(children[1]["code_shop"], "NB_B202");
    }

    #[test]
    fn test_query_string_roundtrip() {
        let expr = QueryExpression::and(vec![
            QueryExpression::field("z", "17"),
            extent_intersect(0.0, 0.0, 1.0, 1.0).unwrap().into(),
        ]);
        let wire = expr.to_query_string().unwrap();
        let parsed: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed, expr.to_value());
    }
}
