//! In-memory collaborators for exercising the mock commands without a
//! PostHog project or a MySQL server.

use async_trait::async_trait;
use event_sink::{CapturedEvent, EventSink, SinkError, SinkStats};
use payments_store::{NewPayment, PaymentRecord, PaymentStore, StoreError};

/// Event sink that keeps everything it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<CapturedEvent>,
    /// `(flag_key, distinct_id)` for every flag evaluation, in call order.
    pub flag_calls: Vec<(String, String)>,
    /// Answer returned for every flag evaluation.
    pub flag_response: Option<String>,
    /// Make every flag evaluation fail.
    pub fail_flag_calls: bool,
    pub shutdowns: usize,
    /// Events captured after a shutdown. Should stay at zero.
    pub captured_after_shutdown: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose flag evaluations answer `variant`.
    pub fn with_flag_response(variant: &str) -> Self {
        Self {
            flag_response: Some(variant.to_string()),
            ..Self::default()
        }
    }

    pub fn events_named(&self, name: &str) -> Vec<&CapturedEvent> {
        self.events.iter().filter(|e| e.event == name).collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn capture(&mut self, event: CapturedEvent) {
        if self.shutdowns > 0 {
            self.captured_after_shutdown += 1;
        }
        self.events.push(event);
    }

    async fn get_flag_variant(
        &mut self,
        flag_key: &str,
        distinct_id: &str,
    ) -> Result<Option<String>, SinkError> {
        self.flag_calls
            .push((flag_key.to_string(), distinct_id.to_string()));
        if self.fail_flag_calls {
            return Err(SinkError::Status {
                url: "memory://decide".to_string(),
                status: 503,
            });
        }
        Ok(self.flag_response.clone())
    }

    async fn shutdown(&mut self) -> SinkStats {
        self.shutdowns += 1;
        SinkStats {
            sent: self.events.len() as u64,
            dropped: 0,
        }
    }
}

/// Payments store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    pub rows: Vec<PaymentRecord>,
    pub table_exists: bool,
    pub ensure_table_calls: usize,
    /// Make `ensure_table` fail as if the server rejected the DDL.
    pub fail_ensure_table: bool,
    pub closed: bool,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_table_creation() -> Self {
        Self {
            fail_ensure_table: true,
            ..Self::default()
        }
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn ensure_table(&mut self) -> Result<(), StoreError> {
        self.check_open()?;
        self.ensure_table_calls += 1;
        if self.fail_ensure_table {
            return Err(StoreError::MySQL(mysql_async::Error::Driver(
                mysql_async::DriverError::PoolDisconnected,
            )));
        }
        self.table_exists = true;
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<u64, StoreError> {
        self.check_open()?;
        if !self.table_exists {
            return Err(StoreError::Decode("table `payments` doesn't exist".to_string()));
        }
        let id = self.rows.len() as u64 + 1;
        // DATETIME keeps whole seconds only.
        let timestamp = payments_store::sql::parse_sql_timestamp(
            &payments_store::format_sql_timestamp(payment.timestamp),
        )?;
        self.rows.push(PaymentRecord {
            id,
            timestamp,
            distinct_id: payment.distinct_id.clone(),
            amount: payment.amount,
        });
        Ok(id)
    }

    async fn payments_for(&mut self, distinct_id: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        self.check_open()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| row.distinct_id == distinct_id)
            .cloned()
            .collect())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }
}
