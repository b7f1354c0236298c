use serde::Deserialize;
use serde_json::Value;

/// One usage window as the dashboard reads it.
///
/// Upstream shapes vary per window (`extra_usage` carries credit fields and a
/// null utilization), so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsageBucket {
    /// Percentage of the window's quota that has been used (0.0 - 100.0)
    #[serde(default)]
    pub utilization: Option<f64>,
    /// When the window resets (ISO-8601)
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Read-only view over the body of `/api/organizations/{org}/usage`.
///
/// The body stays a `serde_json::Value` in the snapshot; windows are parsed
/// one at a time so a surprising window never hides the others.
#[derive(Debug, Clone, Copy)]
pub struct UsageData<'a> {
    body: &'a Value,
}

/// The usage windows the dashboard renders, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageWindow {
    FiveHour,
    SevenDay,
    SevenDaySonnet,
    SevenDayOpus,
    SevenDayCowork,
    ExtraUsage,
}

impl UsageWindow {
    pub fn all() -> &'static [UsageWindow] {
        &[
            UsageWindow::FiveHour,
            UsageWindow::SevenDay,
            UsageWindow::SevenDaySonnet,
            UsageWindow::SevenDayOpus,
            UsageWindow::SevenDayCowork,
            UsageWindow::ExtraUsage,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::FiveHour => "five_hour",
            Self::SevenDay => "seven_day",
            Self::SevenDaySonnet => "seven_day_sonnet",
            Self::SevenDayOpus => "seven_day_opus",
            Self::SevenDayCowork => "seven_day_cowork",
            Self::ExtraUsage => "extra_usage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FiveHour => "Current session",
            Self::SevenDay => "All models",
            Self::SevenDaySonnet => "Sonnet only",
            Self::SevenDayOpus => "Opus only",
            Self::SevenDayCowork => "Cowork",
            Self::ExtraUsage => "Extra usage",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::FiveHour => "5-hour window",
            Self::ExtraUsage => "Overflow",
            _ => "Weekly limit",
        }
    }
}

impl<'a> UsageData<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    /// The window's bucket, or `None` when it is absent, null, not an object,
    /// or has no numeric utilization.
    pub fn window(&self, window: UsageWindow) -> Option<UsageBucket> {
        let raw = self.body.get(window.key())?;
        if !raw.is_object() {
            return None;
        }
        let bucket = UsageBucket::deserialize(raw).unwrap_or_else(|e| {
            tracing::debug!("usage window {}: {}", window.key(), e);
            UsageBucket::default()
        });
        bucket.utilization.map(|_| bucket)
    }
}
