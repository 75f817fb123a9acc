//! Payments table for data warehouse experiment scenarios.
//!
//! The warehouse templates record a `payments` row for every converting
//! user so experiments can use a warehouse table as a metric source. The
//! table is created if missing; nothing else about the schema is managed.

pub mod args;
pub mod error;
pub mod mysql;
pub mod sql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub use args::StoreArgs;
pub use error::StoreError;
pub use mysql::MySqlPaymentStore;
pub use sql::format_sql_timestamp;

/// A payment about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub timestamp: DateTime<Utc>,
    pub distinct_id: String,
    pub amount: Decimal,
}

/// A stored payment row. Timestamps have second precision.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub distinct_id: String,
    pub amount: Decimal,
}

/// Relational store holding the `payments` table.
#[async_trait]
pub trait PaymentStore: Send {
    /// Create the payments table if it does not exist. Safe to call repeatedly.
    async fn ensure_table(&mut self) -> Result<(), StoreError>;

    /// Insert one payment and return its generated id.
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<u64, StoreError>;

    /// All payments recorded for `distinct_id`, oldest id first.
    async fn payments_for(&mut self, distinct_id: &str) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Release the connection. Calling it twice is a no-op; every other
    /// method fails with [`StoreError::Closed`] afterwards.
    async fn close(&mut self) -> Result<(), StoreError>;
}
