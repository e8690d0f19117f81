//! Per-layer refresh bookkeeping.
//!
//! Tokens are monotonically increasing per layer. Only a completion whose
//! token matches the latest issued token may touch the rendered set; every
//! other completion is inert, which is what makes in-flight requests safely
//! abandonable without transport-level cancellation.

use place_common::{PlaceError, PlaceResult};

/// Identifier of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal disposition of one completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was installed into the renderer.
    Applied,
    /// The response belonged to a superseded request and was dropped.
    StaleDiscarded,
    /// The latest request failed; previous rendering left untouched.
    Failed,
}

/// Refresh state for a single rendered layer.
#[derive(Debug)]
pub struct LayerState {
    min_visible_zoom: u32,
    max_visible_zoom: u32,
    next_token: u64,
    in_flight: Option<RequestToken>,
    last_applied: Option<RequestToken>,
}

impl LayerState {
    /// Create state for a layer visible in `[min_visible_zoom, max_visible_zoom]`.
    pub fn new(min_visible_zoom: u32, max_visible_zoom: u32) -> PlaceResult<Self> {
        if min_visible_zoom > max_visible_zoom {
            return Err(PlaceError::InvalidArgument(format!(
                "min visible zoom {} exceeds max visible zoom {}",
                min_visible_zoom, max_visible_zoom
            )));
        }
        Ok(Self {
            min_visible_zoom,
            max_visible_zoom,
            next_token: 0,
            in_flight: None,
            last_applied: None,
        })
    }

    /// Whether the layer should be fetched and rendered at this zoom.
    pub fn is_visible_at(&self, zoom: u32) -> bool {
        zoom >= self.min_visible_zoom && zoom <= self.max_visible_zoom
    }

    /// Issue a fresh token, superseding any in-flight request.
    pub fn issue(&mut self) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.in_flight = Some(token);
        token
    }

    /// Abandon the in-flight request, if any; its completion becomes stale.
    pub fn invalidate(&mut self) {
        self.in_flight = None;
    }

    /// Record a completion. Returns true when the token is the latest
    /// issued one (and consumes it); false means the completion is stale.
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if self.in_flight == Some(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Record that a completed response was installed into the renderer.
    pub fn applied(&mut self, token: RequestToken) {
        self.last_applied = Some(token);
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }

    pub fn last_applied(&self) -> Option<RequestToken> {
        self.last_applied
    }
}
