//! `mock-funnel-experiment-with-trend-metrics`: a funnel whose converting
//! users also send a purchase carrying an `amount`, so the same experiment can
//! be analysed with funnel and trend (sum of amount) metrics.

use anyhow::Context;
use chrono::{DateTime, Utc};
use event_sink::EventSink;
use mock_args::CommonMockArgs;
use mock_generator::{ExperimentGenerator, Template, TimeWindow};

use super::{choose_variant, evaluate_variant, finish, send_plan, MockSummary};

/// Run `mock-funnel-experiment-with-trend-metrics` and drain the sink.
pub async fn mock_funnel_experiment_with_trend_metrics<S: EventSink>(
    sink: &mut S,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let outcome = generate(sink, flag, common, now).await;
    let summary = finish(sink, outcome).await?;

    tracing::info!(
        "Sent funnel events with trend metrics for {flag}: {} users ({} control, {} test), {} events",
        summary.users,
        summary.control_users,
        summary.test_users,
        summary.events
    );
    Ok(summary)
}

async fn generate<S: EventSink>(
    sink: &mut S,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let template = Template::FunnelWithTrendMetrics;
    let window = TimeWindow::ending_at(common.start_date, template.default_lookback(), now)
        .context("Invalid --start_date")?;
    let mut generator = ExperimentGenerator::new(template, flag, window, common.rng());
    let mut summary = MockSummary::default();

    if common.send_initial_events {
        let distinct_id = generator.mint_user();
        let variant = evaluate_variant(sink, flag, &distinct_id).await;
        let plan = generator.plan_initial(distinct_id, variant);
        summary.record(&plan);
        summary.events += send_plan(sink, &plan, true).await;
        return Ok(summary);
    }

    tracing::info!(
        "Generating {} funnel users between {} and {}",
        template.user_count(),
        window.start(),
        window.end()
    );

    // Assignment is local and reported through `$feature_flag_called` at the
    // backdated exposure time.
    for _ in 0..template.user_count() {
        let distinct_id = generator.mint_user();
        let variant = choose_variant(sink, &mut generator, &distinct_id).await;
        let plan = generator.plan_user(distinct_id, variant);
        summary.record(&plan);
        summary.events += send_plan(sink, &plan, true).await;
    }

    Ok(summary)
}
