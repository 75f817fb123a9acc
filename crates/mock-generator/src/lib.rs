//! Randomized experiment traffic generator for experiment-mock.
//!
//! This crate decides *what* to send: which synthetic users exist, which
//! variant each one sees, which events they produce and when, and which of
//! them record a payment. It performs no IO. The caller dispatches the
//! resulting [`UserPlan`]s to an event sink and a payment store.
//!
//! # Architecture
//!
//! ```text
//! Template + flag key + TimeWindow
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │ ExperimentGenerator  │
//! │                      │
//! │  - rng               │──► policy (variant / follow-on / amount)
//! │  - UserIdMinter      │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   UserPlan { distinct_id, variant, events, payment }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeDelta, Utc};
//! use mock_generator::{ExperimentGenerator, Template, TimeWindow};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let now = Utc::now();
//! let window = TimeWindow::new(now - TimeDelta::days(14), now).unwrap();
//! let mut generator =
//!     ExperimentGenerator::new(Template::Trend, "my-flag", window, StdRng::seed_from_u64(42));
//!
//! let user = generator.mint_user();
//! let variant = generator.draw_variant();
//! let plan = generator.plan_user(user, variant);
//! assert_eq!(plan.events[0].name, "[my-flag] event one");
//! ```

pub mod generator;
pub mod policy;
pub mod template;
pub mod user_id;
pub mod variant;
pub mod window;

// Re-exports for convenience
pub use generator::{ExperimentGenerator, GeneratorError, PlannedEvent, PlannedPayment, UserPlan};
pub use policy::AmountRange;
pub use template::{FollowOnDelay, Template, VariantSource};
pub use user_id::UserIdMinter;
pub use variant::Variant;
pub use window::{parse_timestamp, to_iso8601, TimeWindow};
