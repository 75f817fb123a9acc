//! SQL statements and value formatting for the payments table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::StoreError;

/// Name of the only table this crate manages.
pub const PAYMENTS_TABLE: &str = "payments";

/// Idempotent DDL for the payments table.
pub const CREATE_PAYMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS `payments` (\
     `id` INT AUTO_INCREMENT PRIMARY KEY, \
     `timestamp` DATETIME NOT NULL, \
     `distinct_id` VARCHAR(255) NOT NULL, \
     `amount` DECIMAL(10,2) NOT NULL)";

pub const INSERT_PAYMENT: &str =
    "INSERT INTO `payments` (`timestamp`, `distinct_id`, `amount`) VALUES (?, ?, ?)";

/// Values come back as strings so decoding does not depend on driver features.
pub const SELECT_PAYMENTS_FOR: &str = "SELECT `id`, \
     DATE_FORMAT(`timestamp`, '%Y-%m-%d %H:%i:%s'), \
     `distinct_id`, \
     CAST(`amount` AS CHAR) \
     FROM `payments` WHERE `distinct_id` = ? ORDER BY `id`";

const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC instant as a MySQL `DATETIME` literal (`YYYY-MM-DD HH:MM:SS`).
///
/// Sub-second precision is dropped.
pub fn format_sql_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(SQL_TIMESTAMP_FORMAT).to_string()
}

pub fn parse_sql_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    NaiveDateTime::parse_from_str(value, SQL_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Decode(format!("invalid DATETIME '{value}': {e}")))
}

pub fn parse_amount(value: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(value)
        .map_err(|e| StoreError::Decode(format!("invalid DECIMAL '{value}': {e}")))
}
