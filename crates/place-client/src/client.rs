//! Resource fetch operations and shortcut compositions.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use place_common::{BoundingBox, PlaceError, PlaceResult};
use place_query::expr::{DEFAULT_NEAR_MAX_DISTANCE, DEFAULT_NEAR_MIN_DISTANCE};
use place_query::{
    extent_intersect, near, point_intersect, resources, FeatureCollection, Format,
    QueryExpression,
};

use crate::transport::Transport;

/// Options for a generic resource fetch.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Field projection; empty means all fields.
    pub fields: Vec<String>,

    /// Response format. `Json` for generic fetches, `GeoJson` for geo
    /// shortcuts.
    pub format: Format,

    /// Optional filter expression.
    pub where_: Option<QueryExpression>,
}

impl RequestOptions {
    /// Options with GeoJSON output, the default for geo shortcuts.
    pub fn geo() -> Self {
        Self {
            format: Format::GeoJson,
            ..Self::default()
        }
    }

    /// Restrict the response to the given fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Attach a filter expression.
    pub fn with_where(mut self, expr: QueryExpression) -> Self {
        self.where_ = Some(expr);
        self
    }

    /// Build the request's query parameters.
    fn to_params(&self) -> PlaceResult<Vec<(String, String)>> {
        let mut params = vec![("fields".to_string(), self.fields.join(","))];
        if let Some(expr) = &self.where_ {
            params.push(("where".to_string(), expr.to_query_string()?));
        }
        params.push(("format".to_string(), self.format.as_str().to_string()));
        Ok(params)
    }
}

/// Distance band for proximity fetches, in meters.
///
/// Zero values select the service defaults (see `place_query::near` for the
/// falsy-default behavior this inherits).
#[derive(Debug, Clone, Copy)]
pub struct NearOptions {
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for NearOptions {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_NEAR_MIN_DISTANCE,
            max_distance: DEFAULT_NEAR_MAX_DISTANCE,
        }
    }
}

/// Single-shot client for the place API's resource endpoints.
///
/// Fetches are never retried internally; a superseded request is the
/// caller's concern.
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch a single resource by id.
    ///
    /// Fails with `EmptyResult` when the service answers without a payload.
    pub async fn fetch_resource_by_id(
        &self,
        resource: &str,
        id: impl std::fmt::Display,
        options: &RequestOptions,
    ) -> PlaceResult<Value> {
        let path = format!("{}/{}", resource, id);
        let params = options.to_params()?;
        debug!(resource = resource, path = %path, "fetching resource by id");

        let payload = self.transport.get(&path, &params).await?;
        parse_payload(&payload)
    }

    /// Fetch a resource collection, optionally filtered.
    pub async fn fetch_resources(
        &self,
        resource: &str,
        options: &RequestOptions,
    ) -> PlaceResult<Value> {
        let params = options.to_params()?;
        debug!(resource = resource, filtered = options.where_.is_some(), "fetching resources");

        let payload = self.transport.get(resource, &params).await?;
        parse_payload(&payload)
    }

    /// Fetch a resource collection as GeoJSON features.
    pub async fn fetch_features(
        &self,
        resource: &str,
        options: &RequestOptions,
    ) -> PlaceResult<FeatureCollection> {
        let value = self.fetch_resources(resource, options).await?;
        serde_json::from_value(value).map_err(|e| PlaceError::Decode(e.to_string()))
    }

    /// Fetch the features of a resource intersecting an extent.
    ///
    /// Composition: `extent_intersect` + `fetch_features`.
    pub async fn fetch_in_extent(
        &self,
        resource: &str,
        bbox: &BoundingBox,
    ) -> PlaceResult<FeatureCollection> {
        let predicate = extent_intersect(bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax)?;
        let options = RequestOptions::geo().with_where(predicate.into());
        self.fetch_features(resource, &options).await
    }

    /// Fetch the features of a resource intersecting a point.
    ///
    /// Composition: `point_intersect` + `fetch_features`.
    pub async fn fetch_at_point(
        &self,
        resource: &str,
        x: f64,
        y: f64,
    ) -> PlaceResult<FeatureCollection> {
        let predicate = point_intersect(x, y)?;
        let options = RequestOptions::geo().with_where(predicate.into());
        self.fetch_features(resource, &options).await
    }

    /// Fetch the features of a resource within a distance band of a point.
    ///
    /// Composition: `near` + `fetch_features`.
    pub async fn fetch_near(
        &self,
        resource: &str,
        x: f64,
        y: f64,
        options: &NearOptions,
    ) -> PlaceResult<FeatureCollection> {
        let predicate = near(x, y, options.min_distance, options.max_distance)?;
        let request = RequestOptions::geo().with_where(predicate.into());
        self.fetch_features(resource, &request).await
    }

    /// Fetch shops of one type within a distance band of a point.
    ///
    /// Composition: `and(near, {code_shop})` + `fetch_features` against the
    /// `shop` resource.
    pub async fn fetch_near_shops_of_type(
        &self,
        x: f64,
        y: f64,
        code_shop: &str,
        options: &NearOptions,
    ) -> PlaceResult<FeatureCollection> {
        let proximity = near(x, y, options.min_distance, options.max_distance)?;
        let expr = QueryExpression::and(vec![
            proximity.into(),
            QueryExpression::field("code_shop", code_shop),
        ]);
        let request = RequestOptions::geo().with_where(expr);
        self.fetch_features(resources::SHOP, &request).await
    }

    /// Fetch analysis cells intersecting an extent at a given level.
    ///
    /// Composition: `and({z}, extent_intersect)` + `fetch_features` against
    /// the `cell_analysis` resource. The level travels as a string; the
    /// service stores it that way.
    pub async fn fetch_cells_in_extent(
        &self,
        bbox: &BoundingBox,
        zlevel: u32,
    ) -> PlaceResult<FeatureCollection> {
        let extent = extent_intersect(bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax)?;
        let expr = QueryExpression::and(vec![
            QueryExpression::field("z", zlevel.to_string()),
            extent.into(),
        ]);
        let request = RequestOptions::geo().with_where(expr);
        self.fetch_features(resources::CELL_ANALYSIS, &request).await
    }

    /// Fetch the shop type taxonomy, unfiltered.
    pub async fn fetch_shop_types(&self) -> PlaceResult<Value> {
        self.fetch_resources(resources::SHOP_TYPE, &RequestOptions::default())
            .await
    }
}

/// Decode a raw payload, mapping absent data to `EmptyResult`.
fn parse_payload(payload: &[u8]) -> PlaceResult<Value> {
    if payload.is_empty() {
        return Err(PlaceError::EmptyResult);
    }
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| PlaceError::Decode(e.to_string()))?;
    if value.is_null() {
        return Err(PlaceError::EmptyResult);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    /// Transport double that records requests and replays canned payloads.
    struct MockTransport {
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
        response: PlaceResult<Bytes>,
    }

    impl MockTransport {
        fn returning(payload: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(Bytes::copy_from_slice(payload.as_bytes())),
            })
        }

        fn failing(error: PlaceError) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err(error),
            })
        }

        fn last_request(&self) -> (String, Vec<(String, String)>) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, path: &str, params: &[(String, String)]) -> PlaceResult<Bytes> {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), params.to_vec()));
            self.response.clone()
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    const EMPTY_COLLECTION: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    #[tokio::test]
    async fn test_fetch_resources_params() {
        let transport = MockTransport::returning(r#"[{"id": 1}]"#);
        let client = ResourceClient::new(transport.clone());

        let options = RequestOptions::default()
            .with_fields(vec!["name".to_string(), "code_shop".to_string()]);
        let value = client
            .fetch_resources(resources::SHOP, &options)
            .await
            .unwrap();
        assert_eq!(value[0]["id"], 1);

        let (path, params) = transport.last_request();
        assert_eq!(path, "shop");
        assert_eq!(param(&params, "fields"), Some("name,code_shop"));
        assert_eq!(param(&params, "format"), Some("json"));
        assert_eq!(param(&params, "where"), None);
    }

    #[tokio::test]
    async fn test_fetch_by_id_path() {
        let transport = MockTransport::returning(r#"{"id": 7}"#);
        let client = ResourceClient::new(transport.clone());

        let value = client
            .fetch_resource_by_id(resources::REGION, 7, &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(value["id"], 7);

        let (path, params) = transport.last_request();
        assert_eq!(path, "region/7");
        // Empty projection still travels as an empty fields parameter.
        assert_eq!(param(&params, "fields"), Some(""));
    }

    #[tokio::test]
    async fn test_empty_and_null_payloads() {
        let client = ResourceClient::new(MockTransport::returning(""));
        let result = client
            .fetch_resources(resources::SHOP, &RequestOptions::default())
            .await;
        assert_eq!(result, Err(PlaceError::EmptyResult));

        let client = ResourceClient::new(MockTransport::returning("null"));
        let result = client
            .fetch_resources(resources::SHOP, &RequestOptions::default())
            .await;
        assert_eq!(result, Err(PlaceError::EmptyResult));
    }

    #[tokio::test]
    async fn test_empty_collection_is_success() {
        let client = ResourceClient::new(MockTransport::returning(EMPTY_COLLECTION));
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let collection = client
            .fetch_in_extent(resources::SHOP, &bbox)
            .await
            .unwrap();
        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let client = ResourceClient::new(MockTransport::returning("<html>"));
        let result = client
            .fetch_resources(resources::SHOP, &RequestOptions::default())
            .await;
        assert!(matches!(result, Err(PlaceError::Decode(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = ResourceClient::new(MockTransport::failing(PlaceError::Transport(
            "connection refused".to_string(),
        )));
        let result = client
            .fetch_resources(resources::SHOP, &RequestOptions::default())
            .await;
        assert!(matches!(result, Err(PlaceError::Transport(_))));
    }

    #[tokio::test]
    async fn test_extent_shortcut_builds_geo_request() {
        let transport = MockTransport::returning(EMPTY_COLLECTION);
        let client = ResourceClient::new(transport.clone());
        let bbox = BoundingBox::new(2.25, 48.80, 2.45, 48.90).unwrap();

        client
            .fetch_in_extent(resources::TRANSPORTATION, &bbox)
            .await
            .unwrap();

        let (path, params) = transport.last_request();
        assert_eq!(path, "transportation");
        assert_eq!(param(&params, "format"), Some("geojson"));

        let where_: Value = serde_json::from_str(param(&params, "where").unwrap()).unwrap();
        let ring = &where_["geometry"]["$geoIntersects"]["$geometry"]["coordinates"][0];
        assert_eq!(ring.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_near_shops_of_type_composition() {
        let transport = MockTransport::returning(EMPTY_COLLECTION);
        let client = ResourceClient::new(transport.clone());

        client
            .fetch_near_shops_of_type(2.35, 48.85, "NB_B202", &NearOptions::default())
            .await
            .unwrap();

        let (path, params) = transport.last_request();
        assert_eq!(path, "shop");

        let where_: Value = serde_json::from_str(param(&params, "where").unwrap()).unwrap();
        let children = where_["$and"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["geometry"]["$near"]["$maxDistance"], 500.0);
        assert_eq!(children[1]["code_shop"], "NB_B202");
    }

    #[tokio::test]
    async fn test_cells_in_extent_composition() {
        let transport = MockTransport::returning(EMPTY_COLLECTION);
        let client = ResourceClient::new(transport.clone());
        let bbox = BoundingBox::new(2.25, 48.80, 2.45, 48.90).unwrap();

        client.fetch_cells_in_extent(&bbox, 17).await.unwrap();

        let (path, params) = transport.last_request();
        assert_eq!(path, "cell_analysis");

        let where_: Value = serde_json::from_str(param(&params, "where").unwrap()).unwrap();
        let children = where_["$and"].as_array().unwrap();
        // Level filter first, extent second, level as a string.
        assert_eq!(children[0]["z"], "17");
        assert!(children[1]["geometry"]["$geoIntersects"].is_object());
    }
}
