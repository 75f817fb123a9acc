//! Mock command handlers.
//!
//! Each submodule runs one CLI command against caller-provided collaborators.
//! Runners own release: the event sink is always drained, and the payments
//! store always closed, before a runner returns, whether it succeeded or not.

pub mod data_warehouse;
pub mod experiment_events;
pub mod funnel_trend_metrics;

pub use data_warehouse::mock_data_warehouse_experiment;
pub use experiment_events::{mock_experiment_events, ExperimentType};
pub use funnel_trend_metrics::mock_funnel_experiment_with_trend_metrics;

use anyhow::Context;
use event_sink::{CapturedEvent, EventSink, SinkStats};
use mock_generator::{
    to_iso8601, ExperimentGenerator, PlannedPayment, UserPlan, Variant, VariantSource,
};
use payments_store::{NewPayment, PaymentStore};
use rand::Rng;

/// What a mock command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockSummary {
    pub users: usize,
    pub control_users: usize,
    pub test_users: usize,
    pub events: usize,
    pub payments: usize,
    pub sink: SinkStats,
}

impl MockSummary {
    fn record(&mut self, plan: &UserPlan) {
        self.users += 1;
        match plan.variant {
            Variant::Control => self.control_users += 1,
            Variant::Test => self.test_users += 1,
        }
    }
}

/// Capture every planned event for one user, in order.
pub async fn send_plan<S: EventSink>(sink: &mut S, plan: &UserPlan, show_variant: bool) -> usize {
    for event in &plan.events {
        let timestamp = to_iso8601(event.timestamp);
        sink.capture(CapturedEvent {
            event: event.name.clone(),
            distinct_id: plan.distinct_id.clone(),
            timestamp: event.timestamp,
            properties: event.properties.clone(),
        })
        .await;

        if show_variant {
            tracing::info!(
                "Sent {} for {} at {} ({} group)",
                event.name,
                plan.distinct_id,
                timestamp,
                plan.variant
            );
        } else {
            tracing::info!("Sent {} for {} at {}", event.name, plan.distinct_id, timestamp);
        }
    }
    plan.events.len()
}

/// Insert one planned payment. Failures are not retried.
pub async fn record_payment<P: PaymentStore>(
    store: &mut P,
    distinct_id: &str,
    payment: &PlannedPayment,
) -> anyhow::Result<u64> {
    let row = NewPayment {
        timestamp: payment.timestamp,
        distinct_id: distinct_id.to_string(),
        amount: payment.amount,
    };

    let id = store
        .insert_payment(&row)
        .await
        .with_context(|| format!("Failed to insert payment for {distinct_id}"))?;

    tracing::info!(
        "Recorded payment #{} of {} for {} at {}",
        id,
        payment.amount,
        distinct_id,
        payments_store::format_sql_timestamp(payment.timestamp)
    );
    Ok(id)
}

/// Ask the sink for a live variant. A failed evaluation lands in control.
pub async fn evaluate_variant<S: EventSink>(sink: &mut S, flag: &str, distinct_id: &str) -> Variant {
    match sink.get_flag_variant(flag, distinct_id).await {
        Ok(response) => Variant::from_flag_response(response.as_deref()),
        Err(e) => {
            tracing::warn!("Flag evaluation of {flag} for {distinct_id} failed, using control: {e}");
            Variant::Control
        }
    }
}

/// Population-path variant for a user, from wherever the template sources it.
pub async fn choose_variant<S: EventSink, R: Rng>(
    sink: &mut S,
    generator: &mut ExperimentGenerator<R>,
    distinct_id: &str,
) -> Variant {
    match generator.template().variant_source() {
        VariantSource::Remote => evaluate_variant(sink, generator.flag_key(), distinct_id).await,
        VariantSource::Local => generator.draw_variant(),
    }
}

/// Drain the sink and fold its counters into the outcome.
async fn finish<S: EventSink>(
    sink: &mut S,
    outcome: anyhow::Result<MockSummary>,
) -> anyhow::Result<MockSummary> {
    let stats = sink.shutdown().await;
    let mut summary = outcome?;
    summary.sink = stats;
    Ok(summary)
}
