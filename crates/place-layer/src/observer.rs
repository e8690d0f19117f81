//! Loading notifications for UI collaborators.
//!
//! Replaces the historical DOM custom-event broadcast with an explicit
//! registration contract: observers subscribe on the layer handle and
//! receive started/ended/failed callbacks from the layer's serialized event
//! sequence. No contract on presentation.

use place_common::PlaceError;

/// Receiver of per-layer loading notifications.
///
/// Every `loading_started` is paired with exactly one `loading_ended`,
/// including for responses that arrive stale and are discarded.
/// `load_failed` follows `loading_ended` when the latest request fails.
pub trait LoadingObserver: Send {
    fn loading_started(&mut self, layer: &str);

    fn loading_ended(&mut self, layer: &str);

    fn load_failed(&mut self, layer: &str, error: &PlaceError);
}

/// Identifier returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Observer collection owned by the layer actor.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: Vec<(SubscriptionId, Box<dyn LoadingObserver>)>,
}

impl ObserverRegistry {
    pub(crate) fn insert(&mut self, id: SubscriptionId, observer: Box<dyn LoadingObserver>) {
        self.observers.push((id, observer));
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    pub(crate) fn started(&mut self, layer: &str) {
        for (_, observer) in &mut self.observers {
            observer.loading_started(layer);
        }
    }

    pub(crate) fn ended(&mut self, layer: &str) {
        for (_, observer) in &mut self.observers {
            observer.loading_ended(layer);
        }
    }

    pub(crate) fn failed(&mut self, layer: &str, error: &PlaceError) {
        for (_, observer) in &mut self.observers {
            observer.load_failed(layer, error);
        }
    }
}
