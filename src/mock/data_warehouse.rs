//! `mock-data-warehouse-experiment`: page views plus payment rows in MySQL.
//!
//! Variants come from a live flag evaluation per user. The evaluation runs at
//! real time while the page view it gates is backdated into the window, so
//! exposure and evaluation timestamps never line up. Experiment analysis on
//! the warehouse table has to tolerate that skew.

use anyhow::Context;
use chrono::{DateTime, Utc};
use event_sink::EventSink;
use mock_args::CommonMockArgs;
use mock_generator::{ExperimentGenerator, Template, TimeWindow};
use payments_store::PaymentStore;

use super::{choose_variant, evaluate_variant, finish, record_payment, send_plan, MockSummary};

/// Run `mock-data-warehouse-experiment`, then drain the sink and close the store.
pub async fn mock_data_warehouse_experiment<S: EventSink, P: PaymentStore>(
    sink: &mut S,
    store: &mut P,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let outcome = generate(sink, store, flag, common, now).await;
    let closed = store.close().await;
    let summary = finish(sink, outcome).await?;
    closed.context("Failed to close payments store")?;

    if common.send_initial_events {
        tracing::info!("Recorded initial payment for {flag}");
    } else {
        tracing::info!(
            "Sent data warehouse events for {flag}: {} users ({} control, {} test), {} payments",
            summary.users,
            summary.control_users,
            summary.test_users,
            summary.payments
        );
    }
    Ok(summary)
}

async fn generate<S: EventSink, P: PaymentStore>(
    sink: &mut S,
    store: &mut P,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let template = Template::DataWarehouse;
    let window = TimeWindow::ending_at(common.start_date, template.default_lookback(), now)
        .context("Invalid --start_date")?;

    if let Err(e) = store.ensure_table().await {
        tracing::error!("Could not create payments table: {e}");
        return Err(e).context("Failed to create payments table");
    }

    let mut generator = ExperimentGenerator::new(template, flag, window, common.rng());
    let mut summary = MockSummary::default();

    if common.send_initial_events {
        let distinct_id = generator.mint_user();
        let variant = evaluate_variant(sink, flag, &distinct_id).await;
        tracing::info!("Flag {flag} evaluated to {variant} for {distinct_id}");

        let plan = generator.plan_initial(distinct_id, variant);
        summary.record(&plan);
        if let Some(payment) = &plan.payment {
            record_payment(store, &plan.distinct_id, payment).await?;
            summary.payments += 1;
        }

        let stored = store
            .payments_for(&plan.distinct_id)
            .await
            .with_context(|| format!("Failed to look up payments for {}", plan.distinct_id))?;
        for row in &stored {
            tracing::info!(
                "payments row #{}: {} paid {} at {}",
                row.id,
                row.distinct_id,
                row.amount,
                payments_store::format_sql_timestamp(row.timestamp)
            );
        }
        return Ok(summary);
    }

    tracing::info!(
        "Generating {} data warehouse users between {} and {}",
        template.user_count(),
        window.start(),
        window.end()
    );

    for _ in 0..template.user_count() {
        let distinct_id = generator.mint_user();
        let variant = choose_variant(sink, &mut generator, &distinct_id).await;
        let plan = generator.plan_user(distinct_id, variant);
        summary.record(&plan);
        summary.events += send_plan(sink, &plan, true).await;

        if let Some(payment) = &plan.payment {
            record_payment(store, &plan.distinct_id, payment).await?;
            summary.payments += 1;
        }
    }

    Ok(summary)
}
