//! View model shared by the web page and the terminal renderer.
//!
//! Everything here is derived from a single snapshot; nothing is persisted.

use chrono::{DateTime, Local, Utc};

use crate::core::formatter::{
    format_reset_date, format_tier, format_time_until_reset, format_used_percent,
    friendly_model_name, limiter_label, parse_timestamp,
};
use crate::core::models::snapshot::Snapshot;
use crate::core::models::usage::{UsageBucket, UsageWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const HIGH_THRESHOLD: f64 = 90.0;
    pub const MEDIUM_THRESHOLD: f64 = 70.0;

    pub fn from_utilization(utilization: f64) -> Self {
        if utilization >= Self::HIGH_THRESHOLD {
            Self::High
        } else if utilization >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsageBarView {
    pub window: UsageWindow,
    pub utilization: f64,
    pub resets_at: Option<DateTime<Utc>>,
}

impl UsageBarView {
    /// `None` when the bucket carries no utilization to draw.
    fn new(window: UsageWindow, bucket: &UsageBucket) -> Option<Self> {
        Some(Self {
            window,
            utilization: bucket.utilization?,
            resets_at: bucket.resets_at.as_deref().and_then(parse_timestamp),
        })
    }

    pub fn label(&self) -> &'static str {
        self.window.label()
    }

    pub fn subtitle(&self) -> &'static str {
        self.window.subtitle()
    }

    pub fn severity(&self) -> Severity {
        Severity::from_utilization(self.utilization)
    }

    pub fn used_label(&self) -> String {
        format_used_percent(self.utilization)
    }

    /// Bar fill in percent, capped to the track.
    pub fn fill_percent(&self) -> f64 {
        self.utilization.clamp(0.0, 100.0)
    }

    pub fn countdown(&self) -> String {
        self.resets_at
            .as_ref()
            .map(format_time_until_reset)
            .unwrap_or_default()
    }

    pub fn reset_date(&self) -> String {
        self.resets_at
            .as_ref()
            .map(format_reset_date)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimiterView {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitCard {
    pub model_group: String,
    pub title: String,
    pub limiters: Vec<LimiterView>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub bars: Vec<UsageBarView>,
    pub cards: Vec<RateLimitCard>,
    pub tier: String,
    /// When the poller captured the snapshot; the only sign of staleness.
    pub captured_at: DateTime<Utc>,
    pub updated_at: DateTime<Local>,
}

impl DashboardView {
    /// `updated_at` is when this snapshot was received, not when it was captured.
    pub fn new(snapshot: &Snapshot, updated_at: DateTime<Local>) -> Self {
        let usage = snapshot.usage_data();
        let bars = UsageWindow::all()
            .iter()
            .filter_map(|w| usage.window(*w).and_then(|b| UsageBarView::new(*w, &b)))
            .collect();

        let rate_limits = snapshot.rate_limit_data();
        let cards = rate_limits
            .by_model_group()
            .into_iter()
            .map(|(group, limiters)| RateLimitCard {
                model_group: group.to_string(),
                title: friendly_model_name(group),
                limiters: limiters
                    .into_iter()
                    .map(|l| LimiterView {
                        label: limiter_label(&l.limiter),
                        value: l.display_value(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            bars,
            cards,
            tier: format_tier(&rate_limits.rate_limit_tier),
            captured_at: snapshot.timestamp,
            updated_at,
        }
    }
}
