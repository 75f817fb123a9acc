//! MySQL-backed payments store.

use async_trait::async_trait;
use mysql_async::{prelude::*, Conn, OptsBuilder, Pool};

use crate::sql::{
    format_sql_timestamp, parse_amount, parse_sql_timestamp, CREATE_PAYMENTS_TABLE,
    INSERT_PAYMENT, PAYMENTS_TABLE, SELECT_PAYMENTS_FOR,
};
use crate::{NewPayment, PaymentRecord, PaymentStore, StoreArgs, StoreError};

/// Payments store holding one MySQL connection for the whole run.
pub struct MySqlPaymentStore {
    pool: Pool,
    conn: Option<Conn>,
}

impl MySqlPaymentStore {
    /// Connect eagerly so an unreachable server fails before any work starts.
    pub async fn connect(args: &StoreArgs) -> Result<Self, StoreError> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(args.mysql_host.clone())
            .tcp_port(args.mysql_port)
            .user(Some(args.mysql_user.clone()))
            .pass(args.mysql_password.clone())
            .db_name(Some(args.mysql_database.clone()));

        tracing::info!("Connecting to MySQL at {}", args.describe());

        let pool = Pool::new(opts);
        let conn = match pool.get_conn().await {
            Ok(conn) => conn,
            Err(e) => {
                // The pool owns background tasks; shut it down before bailing.
                let _ = pool.disconnect().await;
                return Err(e.into());
            }
        };

        Ok(Self {
            pool,
            conn: Some(conn),
        })
    }

    fn conn(&mut self) -> Result<&mut Conn, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl PaymentStore for MySqlPaymentStore {
    async fn ensure_table(&mut self) -> Result<(), StoreError> {
        self.conn()?.query_drop(CREATE_PAYMENTS_TABLE).await?;
        tracing::info!("Ensured table `{PAYMENTS_TABLE}` exists");
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        conn.exec_drop(
            INSERT_PAYMENT,
            (
                format_sql_timestamp(payment.timestamp),
                payment.distinct_id.as_str(),
                payment.amount.to_string(),
            ),
        )
        .await?;

        conn.last_insert_id()
            .ok_or_else(|| StoreError::Decode("INSERT returned no id".to_string()))
    }

    async fn payments_for(&mut self, distinct_id: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        let rows: Vec<(u64, String, String, String)> =
            self.conn()?.exec(SELECT_PAYMENTS_FOR, (distinct_id,)).await?;

        rows.into_iter()
            .map(|(id, timestamp, distinct_id, amount)| {
                Ok(PaymentRecord {
                    id,
                    timestamp: parse_sql_timestamp(&timestamp)?,
                    distinct_id,
                    amount: parse_amount(&amount)?,
                })
            })
            .collect()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        drop(conn);
        self.pool.clone().disconnect().await?;
        tracing::debug!("MySQL connection closed");
        Ok(())
    }
}
