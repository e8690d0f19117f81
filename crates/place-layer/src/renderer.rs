//! Renderer collaborator and feature styling.
//!
//! The refresh controller owns a `Renderer` capability instead of extending
//! a map library's layer class; the map integration is an adapter at the
//! boundary. Style functions are explicit function-objects carrying their
//! parameters, so re-styling never depends on a captured receiver.

use std::sync::Arc;

use place_common::{resolve_color, Color, ColorRamp};
use place_query::{Feature, FeatureCollection};

/// Resolved rendering style for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_weight: f32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

/// Per-feature style resolution.
pub trait FeatureStyler: Send + Sync {
    fn style(&self, feature: &Feature) -> FeatureStyle;
}

/// Gradient styler for normalized indicator attributes.
///
/// Resolves the feature's attribute value through the color ramp and fills
/// with the bucket color under a white outline.
#[derive(Debug, Clone)]
pub struct GradientStyle {
    attribute: String,
    ramp: ColorRamp,
}

impl GradientStyle {
    pub fn new(attribute: impl Into<String>, ramp: ColorRamp) -> Self {
        Self {
            attribute: attribute.into(),
            ramp,
        }
    }

    /// Gradient over a product's analysis-cell indicator
    /// (`shop_<code>_indice`), on the default diverging ramp.
    pub fn for_product(product_code: &str) -> Self {
        Self::new(
            place_common::indicator_field(product_code),
            ColorRamp::indicator_default(),
        )
    }

    /// The attribute this styler reads.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl FeatureStyler for GradientStyle {
    fn style(&self, feature: &Feature) -> FeatureStyle {
        // Missing or non-numeric indicators fall into the lowest bucket.
        let value = feature.number_property(&self.attribute).unwrap_or(0.0);
        FeatureStyle {
            fill_color: Some(resolve_color(value, &self.ramp)),
            stroke_color: Some(Color::new(0xff, 0xff, 0xff)),
            stroke_weight: 2.0,
            opacity: 1.0,
            fill_opacity: 0.5,
        }
    }
}

/// Map rendering surface for one layer.
///
/// The controller calls these only from the layer's serialized event
/// sequence; implementations need no internal synchronization beyond being
/// sendable into that task.
pub trait Renderer: Send {
    /// Remove all rendered features.
    fn clear(&mut self);

    /// Install a new feature set, replacing nothing — the controller always
    /// clears first so the swap is atomic from the map's point of view.
    fn set_features(&mut self, features: FeatureCollection);

    /// Re-style currently rendered features.
    fn set_style(&mut self, style: Arc<dyn FeatureStyler>);
}
