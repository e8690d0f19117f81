//! Place API resource client.
//!
//! Issues single-shot fetches against the remote place API: a generic
//! "fetch resources" / "fetch resource by id" pair plus the documented
//! shortcut compositions (extent, point, proximity, typed proximity and
//! analysis-cell queries). Retry is deliberately left to the caller; only
//! the refresh controller knows whether a newer request has superseded an
//! older one.

pub mod client;
pub mod transport;

pub use client::{NearOptions, RequestOptions, ResourceClient};
pub use transport::{HttpTransport, Transport, TransportConfig};
