//! experiment-mock library
//!
//! Populates an analytics project with synthetic experiment traffic: backdated
//! events for randomly assigned users, and (for data warehouse scenarios) mock
//! payment rows in MySQL. Useful for demos, QA, and exercising experiment
//! dashboards without real users.
//!
//! # Crates
//!
//! - `mock_generator` - templates, variant/inclusion policy, per-user plans (no IO)
//! - `event_sink` - `EventSink` trait and the PostHog-compatible HTTP sink
//! - `payments_store` - `PaymentStore` trait and the MySQL implementation
//! - `mock_args` - arguments shared by all commands
//!
//! # CLI Usage
//!
//! ```bash
//! # 100 funnel users spread over the last 14 days
//! experiment-mock mock-experiment-events funnel my-flag
//!
//! # Two smoke-test events for one user
//! experiment-mock mock-experiment-events trend my-flag --send-initial-events
//!
//! # Payments in the warehouse, variants from live flag evaluation
//! experiment-mock mock-data-warehouse-experiment my-flag --start_date 2024-01-01
//!
//! # Funnel with purchase amounts for trend metrics
//! experiment-mock mock-funnel-experiment-with-trend-metrics my-flag --seed 7
//! ```

pub mod mock;
pub mod testing;

pub use mock::{
    mock_data_warehouse_experiment, mock_experiment_events,
    mock_funnel_experiment_with_trend_metrics, ExperimentType, MockSummary,
};
