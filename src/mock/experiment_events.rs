//! `mock-experiment-events`: funnel or trend experiment traffic.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use event_sink::EventSink;
use mock_args::CommonMockArgs;
use mock_generator::{ExperimentGenerator, Template, TimeWindow, Variant};

use super::{choose_variant, finish, send_plan, MockSummary};

/// Experiment shapes accepted by `mock-experiment-events`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExperimentType {
    /// `$pageview` on /products followed by `[flag] signup`
    Funnel,
    /// `[flag] event one` followed by `[flag] event two`
    Trend,
}

impl From<ExperimentType> for Template {
    fn from(value: ExperimentType) -> Self {
        match value {
            ExperimentType::Funnel => Template::Funnel,
            ExperimentType::Trend => Template::Trend,
        }
    }
}

/// Run `mock-experiment-events` and drain the sink.
pub async fn mock_experiment_events<S: EventSink>(
    sink: &mut S,
    experiment_type: ExperimentType,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let outcome = generate(sink, experiment_type.into(), flag, common, now).await;
    let summary = finish(sink, outcome).await?;

    if common.send_initial_events {
        tracing::info!("Sent initial events for {flag}");
    } else {
        tracing::info!(
            "Sent events for {flag} experiment: {} users ({} control, {} test), {} events",
            summary.users,
            summary.control_users,
            summary.test_users,
            summary.events
        );
    }
    Ok(summary)
}

async fn generate<S: EventSink>(
    sink: &mut S,
    template: Template,
    flag: &str,
    common: &CommonMockArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<MockSummary> {
    let window = TimeWindow::ending_at(common.start_date, template.default_lookback(), now)
        .context("Invalid --start_date")?;
    let mut generator = ExperimentGenerator::new(template, flag, window, common.rng());
    let mut summary = MockSummary::default();

    if common.send_initial_events {
        let distinct_id = generator.mint_user();
        let plan = generator.plan_initial(distinct_id, Variant::Control);
        summary.record(&plan);
        summary.events += send_plan(sink, &plan, false).await;
        return Ok(summary);
    }

    tracing::info!(
        "Generating {} {} users between {} and {}",
        template.user_count(),
        template,
        window.start(),
        window.end()
    );

    for _ in 0..template.user_count() {
        let distinct_id = generator.mint_user();
        let variant = choose_variant(sink, &mut generator, &distinct_id).await;
        let plan = generator.plan_user(distinct_id, variant);
        summary.record(&plan);
        summary.events += send_plan(sink, &plan, true).await;
    }

    Ok(summary)
}
