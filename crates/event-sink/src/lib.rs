//! Analytics event sink for experiment-mock.
//!
//! The generator hands every event to an [`EventSink`] and asks it for live
//! feature flag evaluations. [`PostHogSink`] talks to a PostHog-compatible
//! HTTP API; tests use an in-memory recorder instead.
//!
//! Capture is fire-and-forget: a sink buffers events and uploads them in
//! batches. A failed upload is logged and counted as dropped, never retried
//! and never surfaced to the caller. [`EventSink::shutdown`] must be awaited
//! before the process exits or buffered events are lost.

pub mod args;
pub mod error;
pub mod posthog;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use args::SinkArgs;
pub use error::SinkError;
pub use posthog::PostHogSink;

/// One analytics event as handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub event: String,
    pub distinct_id: String,
    pub timestamp: DateTime<Utc>,
    pub properties: Map<String, Value>,
}

/// Delivery counters reported by [`EventSink::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Events acknowledged by the backend.
    pub sent: u64,
    /// Events lost to failed uploads.
    pub dropped: u64,
}

/// Destination for captured events and source of live flag evaluations.
#[async_trait]
pub trait EventSink: Send {
    /// Queue an event for delivery.
    async fn capture(&mut self, event: CapturedEvent);

    /// Evaluate `flag_key` for `distinct_id` right now.
    ///
    /// Returns the variant key for multivariate flags and `None` when the
    /// flag is off, boolean, or unknown.
    async fn get_flag_variant(
        &mut self,
        flag_key: &str,
        distinct_id: &str,
    ) -> Result<Option<String>, SinkError>;

    /// Deliver everything still buffered and report totals.
    async fn shutdown(&mut self) -> SinkStats;
}
