//! PostHog-compatible HTTP event sink.
//!
//! Events go to `POST {host}/batch/` with `historical_migration` set, since
//! every timestamp we send is backdated. Flags are evaluated with
//! `POST {host}/decide/?v=3`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CapturedEvent, EventSink, SinkArgs, SinkError, SinkStats};

#[derive(Serialize)]
struct BatchRequest<'a> {
    api_key: &'a str,
    historical_migration: bool,
    batch: Vec<BatchItem<'a>>,
}

#[derive(Serialize)]
struct BatchItem<'a> {
    event: &'a str,
    distinct_id: &'a str,
    timestamp: String,
    properties: &'a Map<String, Value>,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct DecideRequest<'a> {
    api_key: &'a str,
    distinct_id: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct DecideResponse {
    #[serde(rename = "featureFlags", default)]
    feature_flags: HashMap<String, Value>,
}

/// Buffered client for a PostHog-compatible ingestion API.
pub struct PostHogSink {
    client: Client,
    host: String,
    api_key: String,
    flush_at: usize,
    buffer: Vec<CapturedEvent>,
    stats: SinkStats,
}

impl PostHogSink {
    pub fn new(
        host: &str,
        api_key: &str,
        flush_at: usize,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        if api_key.trim().is_empty() {
            return Err(SinkError::Config("PostHog API key is empty".to_string()));
        }
        if flush_at == 0 {
            return Err(SinkError::Config("flush_at must be at least 1".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            flush_at,
            buffer: Vec::with_capacity(flush_at),
            stats: SinkStats::default(),
        })
    }

    pub fn from_args(args: &SinkArgs) -> Result<Self, SinkError> {
        Self::new(
            &args.posthog_host,
            &args.posthog_api_key,
            args.flush_at,
            Duration::from_secs(args.request_timeout_secs),
        )
    }

    async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let events = std::mem::take(&mut self.buffer);
        let count = events.len() as u64;
        match self.post_batch(&events).await {
            Ok(()) => {
                self.stats.sent += count;
                tracing::debug!("Uploaded batch of {count} events to {}", self.host);
            }
            Err(e) => {
                self.stats.dropped += count;
                tracing::warn!("Dropped batch of {count} events: {e}");
            }
        }
    }

    async fn post_batch(&self, events: &[CapturedEvent]) -> Result<(), SinkError> {
        let url = format!("{}/batch/", self.host);
        let body = batch_request(&self.api_key, events);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

fn batch_request<'a>(api_key: &'a str, events: &'a [CapturedEvent]) -> BatchRequest<'a> {
    BatchRequest {
        api_key,
        historical_migration: true,
        batch: events
            .iter()
            .map(|e| BatchItem {
                event: &e.event,
                distinct_id: &e.distinct_id,
                timestamp: e.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                properties: &e.properties,
                kind: "capture",
            })
            .collect(),
    }
}

fn variant_from_decide(response: &DecideResponse, flag_key: &str) -> Option<String> {
    match response.feature_flags.get(flag_key) {
        Some(Value::String(variant)) => Some(variant.clone()),
        _ => None,
    }
}

#[async_trait]
impl EventSink for PostHogSink {
    async fn capture(&mut self, event: CapturedEvent) {
        self.buffer.push(event);
        if self.buffer.len() >= self.flush_at {
            self.flush().await;
        }
    }

    async fn get_flag_variant(
        &mut self,
        flag_key: &str,
        distinct_id: &str,
    ) -> Result<Option<String>, SinkError> {
        let url = format!("{}/decide/?v=3", self.host);
        let body = DecideRequest {
            api_key: &self.api_key,
            distinct_id,
        };

        tracing::debug!("Evaluating flag {flag_key} for {distinct_id}");

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let decide: DecideResponse = response.json().await?;
        Ok(variant_from_decide(&decide, flag_key))
    }

    async fn shutdown(&mut self) -> SinkStats {
        self.flush().await;
        tracing::info!(
            "Event sink drained: {} sent, {} dropped",
            self.stats.sent,
            self.stats.dropped
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(name: &str) -> CapturedEvent {
        let mut properties = Map::new();
        properties.insert("$feature/my-flag".to_string(), Value::from("test"));
        CapturedEvent {
            event: name.to_string(),
            distinct_id: "test-user-abc@example.com".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap(),
            properties,
        }
    }

    #[test]
    fn test_batch_payload() {
        let events = vec![event("$pageview"), event("[my-flag] signup")];
        let body = serde_json::to_value(batch_request("phc_key", &events)).unwrap();

        assert_eq!(body["api_key"], "phc_key");
        assert_eq!(body["historical_migration"], true);
        assert_eq!(body["batch"].as_array().unwrap().len(), 2);
        assert_eq!(body["batch"][0]["event"], "$pageview");
        assert_eq!(body["batch"][0]["type"], "capture");
        assert_eq!(body["batch"][0]["timestamp"], "2024-01-01T08:30:00.000Z");
        assert_eq!(body["batch"][1]["properties"]["$feature/my-flag"], "test");
    }

    #[test]
    fn test_variant_from_decide() {
        let response: DecideResponse = serde_json::from_str(
            r#"{"featureFlags": {"my-flag": "test", "on-off": true, "off": false}}"#,
        )
        .unwrap();

        assert_eq!(variant_from_decide(&response, "my-flag").as_deref(), Some("test"));
        assert_eq!(variant_from_decide(&response, "on-off"), None);
        assert_eq!(variant_from_decide(&response, "off"), None);
        assert_eq!(variant_from_decide(&response, "missing"), None);
    }

    #[test]
    fn test_decide_without_flags() {
        let response: DecideResponse = serde_json::from_str(r#"{"errorsWhileComputingFlags": true}"#).unwrap();
        assert_eq!(variant_from_decide(&response, "my-flag"), None);
    }

    #[test]
    fn test_rejects_bad_config() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            PostHogSink::new("http://localhost", "  ", 20, timeout),
            Err(SinkError::Config(_))
        ));
        assert!(matches!(
            PostHogSink::new("http://localhost", "phc_key", 0, timeout),
            Err(SinkError::Config(_))
        ));
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let sink =
            PostHogSink::new("http://localhost:8000/", "phc_key", 20, Duration::from_secs(1))
                .unwrap();
        assert_eq!(sink.host, "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_unreachable_host_drops_without_error() {
        // Nothing listens on port 1, so every upload fails fast.
        let mut sink =
            PostHogSink::new("http://127.0.0.1:1", "phc_key", 2, Duration::from_secs(2)).unwrap();

        sink.capture(event("one")).await;
        assert_eq!(sink.buffer.len(), 1);
        sink.capture(event("two")).await;
        assert_eq!(sink.buffer.len(), 0);
        sink.capture(event("three")).await;

        let stats = sink.shutdown().await;
        assert_eq!(stats, SinkStats { sent: 0, dropped: 3 });
        assert_eq!(sink.buffer.len(), 0);
    }
}
