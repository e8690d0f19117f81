//! Viewport-driven layer refresh for place API map applications.
//!
//! Each rendered layer owns a [`RefreshController`]: a per-layer actor that
//! listens for viewport changes, gates on zoom visibility, builds the
//! resource query for the visible extent, fetches through
//! [`place_client::ResourceClient`] and atomically swaps the rendered
//! feature set — dropping any response that arrives after a newer request
//! was issued. Rendering, viewport reads and loading indicators are
//! collaborator traits implemented by the map integration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use place_client::{HttpTransport, ResourceClient};
//! use place_common::BoundingBox;
//! use place_layer::{LayerConfig, RefreshController, RefreshQuery, Viewport};
//! # use place_layer::{FeatureStyler, Renderer};
//! # use place_query::FeatureCollection;
//! # struct NullRenderer;
//! # impl Renderer for NullRenderer {
//! #     fn clear(&mut self) {}
//! #     fn set_features(&mut self, _: FeatureCollection) {}
//! #     fn set_style(&mut self, _: Arc<dyn FeatureStyler>) {}
//! # }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("http://localhost:5000/api/v1")?);
//! let client = Arc::new(ResourceClient::new(transport));
//!
//! let shops = RefreshController::spawn(
//!     LayerConfig::new("shop", RefreshQuery::extent("shop")).with_visibility(18, 19),
//!     client,
//!     Box::new(NullRenderer),
//! )?;
//!
//! let viewport = Viewport::new(BoundingBox::new(2.25, 48.80, 2.45, 48.90)?, 18);
//! shops.viewport_changed(viewport).await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod observer;
pub mod recipe;
pub mod renderer;
pub mod state;
pub mod viewport;

pub use controller::{LayerConfig, LayerHandle, LayerStopped, RefreshController};
pub use observer::{LoadingObserver, SubscriptionId};
pub use recipe::{RefreshQuery, CELL_LEVEL_MAX, CELL_LEVEL_MIN};
pub use renderer::{FeatureStyle, FeatureStyler, GradientStyle, Renderer};
pub use state::{LayerState, RefreshOutcome, RequestToken};
pub use viewport::{Viewport, ViewportSource};
