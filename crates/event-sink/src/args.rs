//! CLI argument definitions for the event sink.

use clap::Args;

/// PostHog US cloud ingestion host.
pub const DEFAULT_HOST: &str = "https://us.i.posthog.com";

/// Connection settings for the PostHog-compatible event sink.
#[derive(Args, Clone, Debug)]
pub struct SinkArgs {
    /// Project API key used for capture and flag evaluation
    #[arg(long, env = "POSTHOG_API_KEY", hide_env_values = true)]
    pub posthog_api_key: String,

    /// Ingestion host (e.g., https://eu.i.posthog.com)
    #[arg(long, env = "POSTHOG_HOST", default_value = DEFAULT_HOST)]
    pub posthog_host: String,

    /// Number of buffered events that triggers an upload
    #[arg(long, default_value = "20")]
    pub flush_at: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,
}
