use chrono::{DateTime, Local, Utc};

/// Returns "Resets in 1d 2h 5m" relative to now. If past, returns "Resetting now...".
pub fn format_time_until_reset(resets_at: &DateTime<Utc>) -> String {
    format_time_until_reset_from(resets_at, Utc::now())
}

/// Days and hours are only shown when non-zero; minutes are always shown.
pub fn format_time_until_reset_from(resets_at: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_seconds = (*resets_at - now).num_seconds();

    if total_seconds <= 0 {
        return "Resetting now...".to_string();
    }

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    parts.push(format!("{}m", minutes));

    format!("Resets in {}", parts.join(" "))
}

/// Returns "Wed 3:00 PM" in local time.
pub fn format_reset_date(resets_at: &DateTime<Utc>) -> String {
    resets_at
        .with_timezone(&Local)
        .format("%a %-I:%M %p")
        .to_string()
}

/// Returns "3:04:05 PM", used for the dashboard's last-updated line.
pub fn format_clock_time(at: &DateTime<Local>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// Parse an upstream timestamp. Accepts RFC 3339 and naive ISO-8601 (assumed UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

const MODEL_NAMES: &[(&str, &str)] = &[
    ("claude_3_5_haiku_20241022", "Haiku 3.5"),
    ("claude_3_7_sonnet", "Sonnet 3.7"),
    ("claude_3_haiku", "Haiku 3"),
    ("claude_haiku_4", "Haiku 4"),
    ("claude_sonnet_4", "Sonnet 4"),
    ("claude_opus_4", "Opus 4"),
    ("claude_opus_4_5", "Opus 4.5"),
    ("claude_sonnet_4_5", "Sonnet 4.5"),
    ("claude_haiku_4_5", "Haiku 4.5"),
    ("claude_opus_4_6", "Opus 4.6"),
];

/// Display name for a rate-limit model group, e.g. "claude_opus_4" -> "Opus 4".
///
/// Unknown groups get underscores replaced by spaces and a leading "claude "
/// removed (case-insensitive).
pub fn friendly_model_name(group: &str) -> String {
    if let Some((_, name)) = MODEL_NAMES.iter().find(|(key, _)| *key == group) {
        return name.to_string();
    }

    let spaced = group.replace('_', " ");
    match spaced.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("claude ") => spaced[7..].to_string(),
        _ => spaced,
    }
}

/// Display label for a limiter kind.
pub fn limiter_label(limiter: &str) -> String {
    match limiter {
        "concurrents" => "Concurrent".to_string(),
        "raw_thinking_requests_per_minute" => "Thinking RPM".to_string(),
        other => other.replace('_', " "),
    }
}

/// "default_claude_max_5x" -> "claude max 5x".
pub fn format_tier(tier: &str) -> String {
    tier.replacen("default_", "", 1).replace('_', " ")
}

/// Returns "[████████░░░░]" where █ = used portion, ░ = remaining portion.
pub fn format_usage_bar(used_percent: f64, width: usize) -> String {
    let used_percent = used_percent.clamp(0.0, 100.0);
    let used_blocks = ((used_percent / 100.0) * width as f64).round() as usize;
    let remaining_blocks = width.saturating_sub(used_blocks);

    let filled: String = "█".repeat(used_blocks);
    let empty: String = "░".repeat(remaining_blocks);

    format!("[{}{}]", filled, empty)
}

/// Returns "95% used", rounding to the nearest integer.
pub fn format_used_percent(utilization: f64) -> String {
    format!("{}% used", utilization.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn reset_in_the_past() {
        let now = Utc::now();
        let past = now - Duration::seconds(10);
        assert_eq!(format_time_until_reset_from(&past, now), "Resetting now...");
        assert_eq!(format_time_until_reset_from(&now, now), "Resetting now...");
    }

    #[test]
    fn reset_in_ninety_minutes() {
        let now = Utc::now();
        let result = format_time_until_reset_from(&(now + Duration::minutes(90)), now);
        assert!(result.contains("1h"));
        assert!(result.contains("30m"));
        assert_eq!(result, "Resets in 1h 30m");
    }

    #[test]
    fn reset_under_a_minute_is_minutes_only() {
        let now = Utc::now();
        let result = format_time_until_reset_from(&(now + Duration::seconds(30)), now);
        assert!(!result.is_empty());
        assert_eq!(result, "Resets in 0m");
        assert!(!result.contains('h'));
        assert!(!result.contains('d'));
    }

    #[test]
    fn reset_with_days_skips_zero_hours() {
        let now = Utc::now();
        let result = format_time_until_reset_from(&(now + Duration::minutes(2 * 1440 + 5)), now);
        assert_eq!(result, "Resets in 2d 5m");
    }

    #[test]
    fn reset_uses_wall_clock_by_default() {
        let future = Utc::now() + Duration::hours(25);
        assert!(format_time_until_reset(&future).contains("1d"));
    }

    #[test]
    fn friendly_name_for_every_known_group() {
        for (key, name) in MODEL_NAMES {
            assert_eq!(friendly_model_name(key), *name);
        }
    }

    #[test]
    fn friendly_name_fallback() {
        assert_eq!(friendly_model_name("claude_opus_5"), "opus 5");
        assert_eq!(friendly_model_name("Claude_Mystery_Model"), "Mystery Model");
        assert_eq!(friendly_model_name("CLAUDE_x"), "x");
        assert_eq!(friendly_model_name("other_model"), "other model");
        assert_eq!(friendly_model_name("claude"), "claude");
    }

    #[test]
    fn limiter_labels() {
        assert_eq!(limiter_label("concurrents"), "Concurrent");
        assert_eq!(limiter_label("raw_thinking_requests_per_minute"), "Thinking RPM");
        assert_eq!(limiter_label("requests_per_minute"), "requests per minute");
    }

    #[test]
    fn tier_display() {
        assert_eq!(format_tier("default_pro"), "pro");
        assert_eq!(format_tier("default_claude_max_5x"), "claude max 5x");
        assert_eq!(format_tier("enterprise"), "enterprise");
    }

    #[test]
    fn parse_timestamp_variants() {
        assert!(parse_timestamp("2025-12-04T19:15:00Z").is_some());
        assert!(parse_timestamp("2025-12-04T19:15:00.123456+00:00").is_some());
        assert!(parse_timestamp("2025-12-04T19:15:00.5").is_some());
        assert!(parse_timestamp("not-a-date").is_none());
    }

    #[test]
    fn format_usage_bar_width() {
        assert_eq!(format_usage_bar(0.0, 12), "[░░░░░░░░░░░░]");
        assert_eq!(format_usage_bar(100.0, 12), "[████████████]");
        assert_eq!(format_usage_bar(50.0, 12), "[██████░░░░░░]");
        assert_eq!(format_usage_bar(140.0, 4), "[████]");
    }

    #[test]
    fn used_percent_rounds() {
        assert_eq!(format_used_percent(94.6), "95% used");
        assert_eq!(format_used_percent(0.0), "0% used");
    }
}
