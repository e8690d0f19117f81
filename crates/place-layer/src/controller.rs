//! Viewport-driven refresh controller.
//!
//! One controller per rendered layer, running as a task that consumes a
//! single event channel. Viewport notifications and fetch completions are
//! serialized on that channel, so layer state needs no locking; the fetch
//! itself is the only suspension point and runs in its own task. In-flight
//! fetches are never aborted at the transport level — a superseded response
//! is recognized by its token and dropped on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use place_client::ResourceClient;
use place_common::tile::MAX_TILE_ZOOM;
use place_common::{ColorRamp, PlaceResult};
use place_query::FeatureCollection;

use crate::observer::{LoadingObserver, ObserverRegistry, SubscriptionId};
use crate::recipe::RefreshQuery;
use crate::renderer::{FeatureStyler, GradientStyle, Renderer};
use crate::state::{LayerState, RefreshOutcome, RequestToken};
use crate::viewport::{Viewport, ViewportSource};

/// Queued events per layer; senders briefly await when the map emits
/// faster than the actor drains.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The layer's controller task has exited and no longer accepts events.
#[derive(Debug, Error)]
#[error("layer '{0}' refresh controller has stopped")]
pub struct LayerStopped(pub String);

/// Configuration for one rendered layer.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Layer name, used in notifications and telemetry.
    pub name: String,

    /// Lowest zoom at which the layer is fetched and rendered.
    pub min_visible_zoom: u32,

    /// Highest zoom at which the layer is fetched and rendered.
    pub max_visible_zoom: u32,

    /// How a viewport turns into a fetch.
    pub query: RefreshQuery,
}

impl LayerConfig {
    /// A layer visible at every zoom level.
    pub fn new(name: impl Into<String>, query: RefreshQuery) -> Self {
        Self {
            name: name.into(),
            min_visible_zoom: 0,
            max_visible_zoom: MAX_TILE_ZOOM,
            query,
        }
    }

    /// Restrict visibility to a zoom range.
    pub fn with_visibility(mut self, min_visible_zoom: u32, max_visible_zoom: u32) -> Self {
        self.min_visible_zoom = min_visible_zoom;
        self.max_visible_zoom = max_visible_zoom;
        self
    }
}

enum LayerEvent {
    Viewport(Viewport),
    ApplyStyle(Arc<dyn FeatureStyler>),
    Subscribe(SubscriptionId, Box<dyn LoadingObserver>),
    Unsubscribe(SubscriptionId),
    FetchCompleted {
        token: RequestToken,
        result: PlaceResult<FeatureCollection>,
    },
}

/// The per-layer refresh actor.
pub struct RefreshController {
    name: String,
    state: LayerState,
    query: RefreshQuery,
    client: Arc<ResourceClient>,
    renderer: Box<dyn Renderer>,
    observers: ObserverRegistry,
    /// Weak so the channel closes once every external handle is gone and
    /// the last in-flight fetch has reported back.
    completions: mpsc::WeakSender<LayerEvent>,
}

impl RefreshController {
    /// Start the controller task for a layer and return its handle.
    pub fn spawn(
        config: LayerConfig,
        client: Arc<ResourceClient>,
        renderer: Box<dyn Renderer>,
    ) -> PlaceResult<LayerHandle> {
        let state = LayerState::new(config.min_visible_zoom, config.max_visible_zoom)?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let controller = Self {
            name: config.name.clone(),
            state,
            query: config.query,
            client,
            renderer,
            observers: ObserverRegistry::default(),
            completions: events_tx.downgrade(),
        };
        tokio::spawn(controller.run(events_rx));

        Ok(LayerHandle {
            name: config.name,
            events: events_tx,
            next_subscription: Arc::new(AtomicU64::new(1)),
        })
    }

    async fn run(mut self, mut events: mpsc::Receiver<LayerEvent>) {
        debug!(layer = %self.name, "refresh controller started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!(layer = %self.name, "refresh controller stopped");
    }

    fn handle(&mut self, event: LayerEvent) {
        match event {
            LayerEvent::Viewport(viewport) => self.on_viewport(viewport),
            LayerEvent::FetchCompleted { token, result } => {
                self.on_completed(token, result);
            }
            LayerEvent::ApplyStyle(styler) => {
                debug!(layer = %self.name, "re-styling rendered features");
                self.renderer.set_style(styler);
            }
            LayerEvent::Subscribe(id, observer) => self.observers.insert(id, observer),
            LayerEvent::Unsubscribe(id) => self.observers.remove(id),
        }
    }

    /// Gate on visibility, then issue and spawn the fetch. Synchronous —
    /// the suspension happens only inside the spawned fetch task.
    fn on_viewport(&mut self, viewport: Viewport) {
        if !self.state.is_visible_at(viewport.zoom) {
            debug!(
                layer = %self.name,
                zoom = viewport.zoom,
                "outside visible zoom range, clearing"
            );
            // Any in-flight response must not resurrect cleared features.
            self.state.invalidate();
            self.renderer.clear();
            return;
        }

        let Some(completions) = self.completions.upgrade() else {
            return;
        };

        let token = self.state.issue();
        self.observers.started(&self.name);
        info!(
            layer = %self.name,
            token = %token,
            zoom = viewport.zoom,
            level = ?self.query.level_for(viewport.zoom),
            "refresh started"
        );

        let client = Arc::clone(&self.client);
        let query = self.query.clone();
        tokio::spawn(async move {
            let result = query.execute(&client, &viewport).await;
            // The controller may already be gone; the completion is moot then.
            let _ = completions
                .send(LayerEvent::FetchCompleted { token, result })
                .await;
        });
    }

    fn on_completed(
        &mut self,
        token: RequestToken,
        result: PlaceResult<FeatureCollection>,
    ) -> RefreshOutcome {
        if !self.state.complete(token) {
            debug!(layer = %self.name, token = %token, "discarding stale response");
            // Ends the spinner pairing; the result itself is dropped.
            self.observers.ended(&self.name);
            return RefreshOutcome::StaleDiscarded;
        }

        match result {
            Ok(features) => {
                info!(
                    layer = %self.name,
                    token = %token,
                    features = features.len(),
                    "refresh applied"
                );
                self.renderer.clear();
                self.renderer.set_features(features);
                self.state.applied(token);
                self.observers.ended(&self.name);
                RefreshOutcome::Applied
            }
            Err(error) => {
                warn!(layer = %self.name, token = %token, error = %error, "refresh failed");
                self.observers.ended(&self.name);
                self.observers.failed(&self.name, &error);
                RefreshOutcome::Failed
            }
        }
    }
}

/// Cloneable front for a layer's controller task.
#[derive(Clone)]
pub struct LayerHandle {
    name: String,
    events: mpsc::Sender<LayerEvent>,
    next_subscription: Arc<AtomicU64>,
}

impl LayerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Notify the layer that the viewport changed (pan end / zoom end).
    pub async fn viewport_changed(&self, viewport: Viewport) -> Result<(), LayerStopped> {
        self.send(LayerEvent::Viewport(viewport)).await
    }

    /// Explicitly refresh from the viewport source's current state.
    pub async fn refresh_from(&self, source: &dyn ViewportSource) -> Result<(), LayerStopped> {
        self.send(LayerEvent::Viewport(source.viewport())).await
    }

    /// Re-style rendered features with an explicit styler, without a fetch.
    pub async fn apply_style(&self, styler: Arc<dyn FeatureStyler>) -> Result<(), LayerStopped> {
        self.send(LayerEvent::ApplyStyle(styler)).await
    }

    /// Re-style with a gradient over the given attribute on the default
    /// indicator ramp, without a fetch.
    pub async fn apply_gradient_style(&self, attribute: &str) -> Result<(), LayerStopped> {
        self.apply_style(Arc::new(GradientStyle::new(
            attribute,
            ColorRamp::indicator_default(),
        )))
        .await
    }

    /// Register a loading observer; the returned id unsubscribes it.
    pub async fn subscribe(
        &self,
        observer: Box<dyn LoadingObserver>,
    ) -> Result<SubscriptionId, LayerStopped> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.send(LayerEvent::Subscribe(id, observer)).await?;
        Ok(id)
    }

    /// Remove a previously registered observer.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), LayerStopped> {
        self.send(LayerEvent::Unsubscribe(id)).await
    }

    async fn send(&self, event: LayerEvent) -> Result<(), LayerStopped> {
        self.events
            .send(event)
            .await
            .map_err(|_| LayerStopped(self.name.clone()))
    }
}
