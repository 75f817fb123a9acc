//! Variant and event-inclusion policy.
//!
//! Every random decision the generator makes goes through this module. Each
//! function takes a pre-drawn roll in `[0, 1)` so the probability table can be
//! tested without an RNG, a clock or a network.
//!
//! | Template                  | control | test |
//! |---------------------------|---------|------|
//! | Funnel / Trend            | 0.40    | 0.40 |
//! | DataWarehouse (payment)   | 0.40    | 0.50 |
//! | FunnelWithTrendMetrics    | 0.50    | 0.51 |

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::template::{FollowOnDelay, Template};
use crate::variant::Variant;

/// Share of users assigned to control by a local coin flip.
pub const CONTROL_SHARE: f64 = 0.5;

/// Amount range for payments and purchases on the population path.
pub const POPULATION_AMOUNT: AmountRange = AmountRange::new(200, 2000);

/// Amount range for the single payment on the initial path.
pub const INITIAL_AMOUNT: AmountRange = AmountRange::new(500, 1000);

/// Half-open amount range in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min_cents: i64,
    pub max_cents: i64,
}

impl AmountRange {
    pub const fn new(min_cents: i64, max_cents: i64) -> Self {
        Self {
            min_cents,
            max_cents,
        }
    }

    pub fn min(&self) -> Decimal {
        Decimal::new(self.min_cents, 2)
    }

    pub fn max(&self) -> Decimal {
        Decimal::new(self.max_cents, 2)
    }

    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min() && amount < self.max()
    }
}

/// Local variant assignment.
pub fn assign_variant(roll: f64) -> Variant {
    if roll < CONTROL_SHARE {
        Variant::Control
    } else {
        Variant::Test
    }
}

/// Probability that a user in `variant` gets the follow-on event or payment.
///
/// The arms differ on purpose for some templates so dashboards show an effect.
pub fn follow_on_probability(template: Template, variant: Variant) -> f64 {
    match (template, variant) {
        (Template::Funnel | Template::Trend, _) => 0.4,
        (Template::DataWarehouse, Variant::Control) => 0.4,
        (Template::DataWarehouse, Variant::Test) => 0.5,
        (Template::FunnelWithTrendMetrics, Variant::Control) => 0.5,
        (Template::FunnelWithTrendMetrics, Variant::Test) => 0.51,
    }
}

pub fn include_follow_on(template: Template, variant: Variant, roll: f64) -> bool {
    roll < follow_on_probability(template, variant)
}

/// Pick an amount in `range` for `roll`. Never returns the upper bound.
pub fn amount_for_roll(range: AmountRange, roll: f64) -> Decimal {
    let span = (range.max_cents - range.min_cents).max(1);
    let offset = ((roll.clamp(0.0, 1.0) * span as f64) as i64).min(span - 1);
    Decimal::new(range.min_cents + offset, 2)
}

/// Delay between an event and its follow-on.
///
/// `remaining` is the time left until the end of the window; it bounds the
/// `RemainingWindow` delay and is ignored for fixed minute ranges.
pub fn delay_for_roll(delay: FollowOnDelay, remaining: TimeDelta, roll: f64) -> TimeDelta {
    let roll = roll.clamp(0.0, 1.0);
    match delay {
        FollowOnDelay::Minutes { min, max } => {
            let span_ms = ((max - min) * 60_000) as f64;
            TimeDelta::minutes(min) + TimeDelta::milliseconds((roll * span_ms) as i64)
        }
        FollowOnDelay::RemainingWindow => {
            let remaining_ms = remaining.num_milliseconds().max(0) as f64;
            TimeDelta::milliseconds((roll * remaining_ms) as i64)
        }
    }
}
