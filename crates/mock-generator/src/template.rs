//! Experiment templates.
//!
//! A template fixes the shape of the traffic for one command: how many users,
//! how far back the window reaches by default, where the variant comes from,
//! and which events are sent.

use chrono::TimeDelta;

/// The traffic shape being mocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// `$pageview` on `/products` followed by a signup.
    Funnel,
    /// Two custom events, `event one` then `event two`.
    Trend,
    /// A pricing page view followed by a payment row in the warehouse.
    DataWarehouse,
    /// A funnel whose converting users also send a purchase with an amount.
    FunnelWithTrendMetrics,
}

/// Where a population-path user's variant comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSource {
    /// Local coin flip.
    Local,
    /// Live flag evaluation against the event sink.
    Remote,
}

/// How long after the previous event a follow-on happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOnDelay {
    /// Uniform number of minutes in `[min, max)`.
    Minutes { min: i64, max: i64 },
    /// Anywhere between the previous event and the end of the window.
    RemainingWindow,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funnel => "funnel",
            Self::Trend => "trend",
            Self::DataWarehouse => "data-warehouse",
            Self::FunnelWithTrendMetrics => "funnel-with-trend-metrics",
        }
    }

    /// Number of synthetic users on the population path.
    pub fn user_count(&self) -> usize {
        match self {
            Self::Funnel | Self::Trend => 100,
            Self::DataWarehouse => 25,
            Self::FunnelWithTrendMetrics => 200,
        }
    }

    /// Window length used when no start date is given.
    pub fn default_lookback(&self) -> TimeDelta {
        match self {
            Self::DataWarehouse => TimeDelta::days(10),
            _ => TimeDelta::days(14),
        }
    }

    /// How far in the past the initial events are timestamped.
    pub fn initial_offset(&self) -> TimeDelta {
        match self {
            Self::Funnel | Self::Trend => TimeDelta::hours(12),
            Self::DataWarehouse | Self::FunnelWithTrendMetrics => TimeDelta::hours(24),
        }
    }

    pub fn variant_source(&self) -> VariantSource {
        match self {
            Self::DataWarehouse => VariantSource::Remote,
            _ => VariantSource::Local,
        }
    }

    /// Name of the event every user sends.
    pub fn first_event(&self, flag_key: &str) -> String {
        match self {
            Self::Trend => format!("[{flag_key}] event one"),
            Self::Funnel | Self::DataWarehouse | Self::FunnelWithTrendMetrics => {
                "$pageview".to_string()
            }
        }
    }

    /// `$current_url` attached to the first event, if it is a pageview.
    pub fn first_event_url(&self) -> Option<&'static str> {
        match self {
            Self::Funnel | Self::FunnelWithTrendMetrics => Some("/products"),
            Self::DataWarehouse => Some("/pricing"),
            Self::Trend => None,
        }
    }

    /// Name of the conditional second event. Data warehouse users record a
    /// payment row instead.
    pub fn follow_on_event(&self, flag_key: &str) -> Option<String> {
        match self {
            Self::Funnel | Self::FunnelWithTrendMetrics => Some(format!("[{flag_key}] signup")),
            Self::Trend => Some(format!("[{flag_key}] event two")),
            Self::DataWarehouse => None,
        }
    }

    /// Name of the property-bearing third event.
    pub fn metric_event(&self, flag_key: &str) -> Option<String> {
        match self {
            Self::FunnelWithTrendMetrics => Some(format!("[{flag_key}] purchase")),
            _ => None,
        }
    }

    pub fn follow_on_delay(&self) -> FollowOnDelay {
        match self {
            Self::DataWarehouse => FollowOnDelay::RemainingWindow,
            _ => FollowOnDelay::Minutes { min: 5, max: 30 },
        }
    }

    /// Whether the local assignment is reported with a `$feature_flag_called`
    /// event so experiment analysis can attribute exposure.
    pub fn reports_exposure(&self) -> bool {
        matches!(self, Self::FunnelWithTrendMetrics)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Template::Funnel.first_event("f"), "$pageview");
        assert_eq!(
            Template::Funnel.follow_on_event("f").as_deref(),
            Some("[f] signup")
        );
        assert_eq!(Template::Trend.first_event("f"), "[f] event one");
        assert_eq!(
            Template::Trend.follow_on_event("f").as_deref(),
            Some("[f] event two")
        );
        assert_eq!(Template::DataWarehouse.follow_on_event("f"), None);
        assert_eq!(
            Template::FunnelWithTrendMetrics.metric_event("f").as_deref(),
            Some("[f] purchase")
        );
    }

    #[test]
    fn test_user_counts() {
        assert_eq!(Template::Funnel.user_count(), 100);
        assert_eq!(Template::Trend.user_count(), 100);
        assert_eq!(Template::DataWarehouse.user_count(), 25);
        assert_eq!(Template::FunnelWithTrendMetrics.user_count(), 200);
    }

    #[test]
    fn test_only_data_warehouse_is_remote() {
        assert_eq!(
            Template::DataWarehouse.variant_source(),
            VariantSource::Remote
        );
        assert_eq!(Template::Funnel.variant_source(), VariantSource::Local);
        assert_eq!(
            Template::FunnelWithTrendMetrics.variant_source(),
            VariantSource::Local
        );
    }

    #[test]
    fn test_lookback_defaults() {
        assert_eq!(Template::DataWarehouse.default_lookback(), TimeDelta::days(10));
        assert_eq!(Template::Trend.default_lookback(), TimeDelta::days(14));
    }
}
