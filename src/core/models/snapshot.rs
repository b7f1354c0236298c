use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::models::rate_limits::RateLimitData;
use crate::core::models::usage::UsageData;

/// One poll result: both endpoint bodies plus the capture time.
///
/// The bodies are stored as received. Written whole by the poller and read
/// whole by the server; there is no history and no merging between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub usage: Value,
    pub rate_limits: Value,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(usage: Value, rate_limits: Value) -> Self {
        Self {
            usage,
            rate_limits,
            timestamp: Utc::now(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn usage_data(&self) -> UsageData<'_> {
        UsageData::new(&self.usage)
    }

    pub fn rate_limit_data(&self) -> RateLimitData {
        RateLimitData::from_value(&self.rate_limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::usage::UsageWindow;
    use serde_json::json;

    #[test]
    fn wire_format_uses_camel_case_rate_limits() {
        let json = r#"{
            "usage": { "five_hour": { "utilization": 95, "resets_at": "2030-01-01T00:00:00Z" } },
            "rateLimits": { "rate_limit_tier": "default_pro", "tier_model_rate_limiters": [] },
            "timestamp": "2026-10-18T09:30:00.000Z"
        }"#;
        let snapshot = Snapshot::from_slice(json.as_bytes()).unwrap();
        assert_eq!(snapshot.rate_limit_data().rate_limit_tier, "default_pro");
        assert_eq!(
            snapshot.usage_data().window(UsageWindow::FiveHour).unwrap().utilization,
            Some(95.0)
        );

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("rateLimits").is_some());
        assert!(value.get("rate_limits").is_none());
        assert!(value["timestamp"].as_str().unwrap().starts_with("2026-10-18T09:30:00"));
    }

    #[test]
    fn bodies_are_kept_as_received() {
        let usage = json!({
            "five_hour": { "utilization": 12, "resets_at": null, "new_field": [1, 2] },
            "extra_usage": { "is_enabled": false, "monthly_limit": null, "used_credits": null, "utilization": null }
        });
        let rate_limits = json!({ "rate_limit_tier": "default_pro", "brand_new": true });
        let snapshot = Snapshot::new(usage.clone(), rate_limits.clone());

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["usage"], usage);
        assert_eq!(value["rateLimits"], rate_limits);
    }

    #[test]
    fn missing_rate_limits_is_rejected() {
        let json = r#"{ "usage": {}, "timestamp": "2026-10-18T09:30:00Z" }"#;
        assert!(Snapshot::from_slice(json.as_bytes()).is_err());
    }
}
