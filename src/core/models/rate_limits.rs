use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelRateLimiter {
    /// Limiter kind, e.g. "concurrents" or "requests_per_minute"
    pub limiter: String,
    #[serde(default)]
    pub value: Value,
    pub model_group: String,
}

impl ModelRateLimiter {
    /// Numbers keep their upstream form ("2", not "2.0").
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::Null => "n/a".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Read-only view over the body of `/api/organizations/{org}/rate_limits`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitData {
    pub rate_limit_tier: String,
    pub tier_model_rate_limiters: Vec<ModelRateLimiter>,
}

impl RateLimitData {
    /// Entries without a string `limiter` and `model_group` are dropped; the
    /// rest keep their upstream order.
    pub fn from_value(body: &Value) -> Self {
        let rate_limit_tier = body
            .get("rate_limit_tier")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let tier_model_rate_limiters = body
            .get("tier_model_rate_limiters")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| ModelRateLimiter::deserialize(entry).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            rate_limit_tier,
            tier_model_rate_limiters,
        }
    }

    /// Group limiters by model group, keeping the order in which groups first appear.
    pub fn by_model_group(&self) -> Vec<(&str, Vec<&ModelRateLimiter>)> {
        let mut groups: Vec<(&str, Vec<&ModelRateLimiter>)> = Vec::new();
        for limiter in &self.tier_model_rate_limiters {
            match groups
                .iter_mut()
                .find(|(group, _)| *group == limiter.model_group)
            {
                Some((_, entries)) => entries.push(limiter),
                None => groups.push((limiter.model_group.as_str(), vec![limiter])),
            }
        }
        groups
    }
}
