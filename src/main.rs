//! Command-line interface for experiment-mock
//!
//! # Usage Examples
//!
//! ## Experiment events
//! ```bash
//! # 100 users over the last 14 days, ~40% of them convert
//! experiment-mock mock-experiment-events funnel my-flag
//!
//! # Custom window start
//! experiment-mock mock-experiment-events trend my-flag \
//!   --start_date 2024-01-01T00:00:00.000Z
//!
//! # One user, two events, 12 hours ago
//! experiment-mock mock-experiment-events funnel my-flag --send-initial-events
//! ```
//!
//! ## Data warehouse
//! ```bash
//! # Needs MYSQL_HOST / MYSQL_USER / MYSQL_PASSWORD / MYSQL_DATABASE
//! experiment-mock mock-data-warehouse-experiment my-flag
//! ```
//!
//! ## Funnel with trend metrics
//! ```bash
//! experiment-mock mock-funnel-experiment-with-trend-metrics my-flag --seed 42
//! ```
//!
//! ## Environment
//! - `POSTHOG_API_KEY`, `POSTHOG_HOST` - event sink
//! - `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_DATABASE` - payments store
//! - `RUST_LOG` - log filter (default `info`)
//!
//! Values are also read from a `.env` file in the working directory when present.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use event_sink::{EventSink, PostHogSink, SinkArgs};
use experiment_mock::mock::{
    mock_data_warehouse_experiment, mock_experiment_events,
    mock_funnel_experiment_with_trend_metrics, ExperimentType,
};
use mock_args::CommonMockArgs;
use payments_store::{MySqlPaymentStore, StoreArgs};

#[derive(Parser)]
#[command(name = "experiment-mock")]
#[command(version)]
#[command(about = "Populate an analytics project with mock experiment events and payments")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send mock funnel or trend experiment events
    MockExperimentEvents {
        /// The type of experiment to mock
        #[arg(value_enum)]
        experiment_type: ExperimentType,

        /// The feature flag associated with the experiment
        flag: String,

        #[command(flatten)]
        common: CommonMockArgs,

        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Record mock payments in a warehouse table for a flag experiment
    MockDataWarehouseExperiment {
        /// The feature flag associated with the experiment
        flag: String,

        #[command(flatten)]
        common: CommonMockArgs,

        #[command(flatten)]
        sink: SinkArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Send a funnel experiment whose conversions carry purchase amounts
    MockFunnelExperimentWithTrendMetrics {
        /// The feature flag associated with the experiment
        flag: String,

        #[command(flatten)]
        common: CommonMockArgs,

        #[command(flatten)]
        sink: SinkArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let now = Utc::now();

    match cli.command {
        Commands::MockExperimentEvents {
            experiment_type,
            flag,
            common,
            sink,
        } => {
            let mut sink =
                PostHogSink::from_args(&sink).context("Failed to create PostHog client")?;
            mock_experiment_events(&mut sink, experiment_type, &flag, &common, now).await?;
        }
        Commands::MockDataWarehouseExperiment {
            flag,
            common,
            sink,
            store,
        } => {
            let mut sink =
                PostHogSink::from_args(&sink).context("Failed to create PostHog client")?;
            let mut store = match MySqlPaymentStore::connect(&store).await {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!("Could not connect to MySQL at {}: {e}", store.describe());
                    sink.shutdown().await;
                    return Err(e).context("Failed to connect to MySQL");
                }
            };
            mock_data_warehouse_experiment(&mut sink, &mut store, &flag, &common, now).await?;
        }
        Commands::MockFunnelExperimentWithTrendMetrics { flag, common, sink } => {
            let mut sink =
                PostHogSink::from_args(&sink).context("Failed to create PostHog client")?;
            mock_funnel_experiment_with_trend_metrics(&mut sink, &flag, &common, now).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["experiment-mock"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn test_experiment_events_args() {
        let cli = parse(&[
            "mock-experiment-events",
            "trend",
            "my-flag",
            "--start_date",
            "2024-01-01T00:00:00.000Z",
            "--posthog-api-key",
            "phc_test",
        ])
        .unwrap();

        let Commands::MockExperimentEvents {
            experiment_type,
            flag,
            common,
            sink,
        } = cli.command
        else {
            panic!("expected mock-experiment-events");
        };
        assert_eq!(experiment_type, ExperimentType::Trend);
        assert_eq!(flag, "my-flag");
        assert_eq!(
            common.start_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(!common.send_initial_events);
        assert_eq!(sink.posthog_api_key, "phc_test");
        assert_eq!(sink.flush_at, 20);
    }

    #[test]
    fn test_invalid_experiment_type_rejected() {
        let err = parse(&[
            "mock-experiment-events",
            "retention",
            "my-flag",
            "--posthog-api-key",
            "phc_test",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_invalid_start_date_rejected() {
        let err = parse(&[
            "mock-funnel-experiment-with-trend-metrics",
            "my-flag",
            "--start_date",
            "soon",
            "--posthog-api-key",
            "phc_test",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_data_warehouse_args() {
        let cli = parse(&[
            "mock-data-warehouse-experiment",
            "my-flag",
            "--send-initial-events",
            "--posthog-api-key",
            "phc_test",
            "--mysql-host",
            "db",
            "--mysql-user",
            "root",
            "--mysql-database",
            "warehouse",
        ])
        .unwrap();

        let Commands::MockDataWarehouseExperiment {
            flag,
            common,
            store,
            ..
        } = cli.command
        else {
            panic!("expected mock-data-warehouse-experiment");
        };
        assert_eq!(flag, "my-flag");
        assert!(common.send_initial_events);
        assert_eq!(store.mysql_host, "db");
        assert_eq!(store.mysql_port, 3306);
        assert_eq!(store.mysql_database, "warehouse");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
