//! Common CLI argument definitions shared by all mock commands.

use chrono::{DateTime, Utc};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Common arguments shared by all mock commands.
#[derive(Args, Clone, Debug, Default)]
pub struct CommonMockArgs {
    /// Start of the event window (ISO 8601 or YYYY-MM-DD). Defaults to a
    /// template-specific number of days before now
    #[arg(long = "start_date", visible_alias = "start-date", value_parser = parse_start_date)]
    pub start_date: Option<DateTime<Utc>>,

    /// Send a short fixed sequence for one user instead of a population
    #[arg(long)]
    pub send_initial_events: bool,

    /// Random seed for reproducible draws (timestamps still follow the clock)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommonMockArgs {
    /// RNG for this run: seeded when `--seed` is given, OS entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// clap value parser for `--start_date`.
pub fn parse_start_date(value: &str) -> Result<DateTime<Utc>, String> {
    mock_generator::parse_timestamp(value).ok_or_else(|| {
        format!("invalid date '{value}': expected ISO 8601 (2024-01-01T00:00:00.000Z) or YYYY-MM-DD")
    })
}
