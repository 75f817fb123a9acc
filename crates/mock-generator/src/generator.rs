//! Per-user traffic planning.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::policy::{self, AmountRange, INITIAL_AMOUNT, POPULATION_AMOUNT};
use crate::template::Template;
use crate::user_id::UserIdMinter;
use crate::variant::Variant;
use crate::window::TimeWindow;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The window has zero or negative width.
    #[error("Start date {start} must be before {end}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// An event to capture for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub properties: Map<String, Value>,
}

/// A payment row to record for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPayment {
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
}

/// Everything one synthetic user does, in send order.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPlan {
    pub distinct_id: String,
    pub variant: Variant,
    pub events: Vec<PlannedEvent>,
    pub payment: Option<PlannedPayment>,
}

/// Plans randomized experiment traffic for one template and flag.
pub struct ExperimentGenerator<R> {
    template: Template,
    flag_key: String,
    window: TimeWindow,
    rng: R,
    minter: UserIdMinter,
}

impl<R: Rng> ExperimentGenerator<R> {
    pub fn new(template: Template, flag_key: impl Into<String>, window: TimeWindow, rng: R) -> Self {
        Self {
            template,
            flag_key: flag_key.into(),
            window,
            rng,
            minter: UserIdMinter::new(),
        }
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    /// A fresh synthetic user id, unique for this generator.
    pub fn mint_user(&mut self) -> String {
        self.minter.mint(&mut self.rng)
    }

    /// Local coin-flip assignment.
    pub fn draw_variant(&mut self) -> Variant {
        policy::assign_variant(self.rng.random())
    }

    /// Plan the population-path traffic for one user.
    pub fn plan_user(&mut self, distinct_id: String, variant: Variant) -> UserPlan {
        let template = self.template;
        let first_at = self.window.random_instant(&mut self.rng);

        let mut events = Vec::new();
        if template.reports_exposure() {
            events.push(self.exposure_event(variant, first_at));
        }
        events.push(self.first_event(variant, first_at));

        let mut payment = None;
        if policy::include_follow_on(template, variant, self.rng.random()) {
            match template.follow_on_event(&self.flag_key) {
                Some(name) => {
                    let second_at = self.follow_on_time(first_at);
                    events.push(PlannedEvent {
                        name,
                        timestamp: second_at,
                        properties: self.exposure_properties(variant),
                    });

                    if let Some(name) = template.metric_event(&self.flag_key) {
                        let third_at = self.follow_on_time(second_at);
                        let amount = self.draw_amount(POPULATION_AMOUNT);
                        events.push(self.metric_event(name, variant, third_at, amount));
                    }
                }
                None => {
                    payment = Some(PlannedPayment {
                        timestamp: self.follow_on_time(first_at),
                        amount: self.draw_amount(POPULATION_AMOUNT),
                    });
                }
            }
        }

        UserPlan {
            distinct_id,
            variant,
            events,
            payment,
        }
    }

    /// Plan the fixed smoke-test traffic for a single user.
    ///
    /// Timestamps sit at `end - initial_offset`, pulled forward to the window
    /// start when the window is shorter than the offset.
    pub fn plan_initial(&mut self, distinct_id: String, variant: Variant) -> UserPlan {
        let template = self.template;
        let at = (self.window.end() - template.initial_offset()).max(self.window.start());

        let mut events = Vec::new();
        let mut payment = None;
        match template {
            Template::Funnel | Template::Trend | Template::FunnelWithTrendMetrics => {
                events.push(self.first_event(variant, at));
                if let Some(name) = template.follow_on_event(&self.flag_key) {
                    events.push(PlannedEvent {
                        name,
                        timestamp: at,
                        properties: self.exposure_properties(variant),
                    });
                }
                if let Some(name) = template.metric_event(&self.flag_key) {
                    let amount = self.draw_amount(INITIAL_AMOUNT);
                    events.push(self.metric_event(name, variant, at, amount));
                }
            }
            Template::DataWarehouse => {
                payment = Some(PlannedPayment {
                    timestamp: at,
                    amount: self.draw_amount(INITIAL_AMOUNT),
                });
            }
        }

        UserPlan {
            distinct_id,
            variant,
            events,
            payment,
        }
    }

    fn follow_on_time(&mut self, after: DateTime<Utc>) -> DateTime<Utc> {
        let delay = policy::delay_for_roll(
            self.template.follow_on_delay(),
            self.window.remaining_after(after),
            self.rng.random(),
        );
        self.window.clamp(after + delay)
    }

    fn draw_amount(&mut self, range: AmountRange) -> Decimal {
        policy::amount_for_roll(range, self.rng.random())
    }

    fn exposure_properties(&self, variant: Variant) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert(
            format!("$feature/{}", self.flag_key),
            Value::String(variant.to_string()),
        );
        properties
    }

    fn first_event(&self, variant: Variant, at: DateTime<Utc>) -> PlannedEvent {
        let mut properties = self.exposure_properties(variant);
        if let Some(url) = self.template.first_event_url() {
            properties.insert("$current_url".to_string(), Value::String(url.to_string()));
        }
        PlannedEvent {
            name: self.template.first_event(&self.flag_key),
            timestamp: at,
            properties,
        }
    }

    fn exposure_event(&self, variant: Variant, at: DateTime<Utc>) -> PlannedEvent {
        let mut properties = self.exposure_properties(variant);
        properties.insert(
            "$feature_flag".to_string(),
            Value::String(self.flag_key.clone()),
        );
        properties.insert(
            "$feature_flag_response".to_string(),
            Value::String(variant.to_string()),
        );
        PlannedEvent {
            name: "$feature_flag_called".to_string(),
            timestamp: at,
            properties,
        }
    }

    fn metric_event(
        &self,
        name: String,
        variant: Variant,
        at: DateTime<Utc>,
        amount: Decimal,
    ) -> PlannedEvent {
        let mut properties = self.exposure_properties(variant);
        let amount = amount
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        properties.insert("amount".to_string(), amount);
        PlannedEvent {
            name,
            timestamp: at,
            properties,
        }
    }
}
