use chrono::Local;
use colored::{control, ColoredString, Colorize};

use crate::core::dashboard::{DashboardView, Severity, UsageBarView};
use crate::core::formatter::{format_clock_time, format_usage_bar};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 16;

/// Render the dashboard as a colored (or plain) string.
///
/// Layout:
/// ```text
///  Claude usage · max 5x
///   Current session  95% used [███████████████████░]
///                    Resets in 2h 15m · Sat 1:00 AM
///   All models       41% used [████████░░░░░░░░░░░░]
///                    Resets in 3d 4h 0m · Mon 9:00 AM
///
///  Opus 4
///   Concurrent: 2
///   Thinking RPM: 50
///
///  Updated 9:31:02 AM · captured 9:30:12 AM
/// ```
pub fn render_dashboard(view: &DashboardView, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    let mut header = " Claude usage".to_string();
    if !view.tier.is_empty() {
        header.push_str(&format!(" · {}", view.tier));
    }
    lines.push(header.bold().to_string());

    if view.bars.is_empty() {
        lines.push(format!("  {}", "No usage windows reported".dimmed()));
    }
    for bar in &view.bars {
        render_bar(&mut lines, bar);
    }

    for card in &view.cards {
        lines.push(String::new());
        lines.push(format!(" {}", card.title.bold()));
        for limiter in &card.limiters {
            lines.push(format!("  {} {}", format!("{}:", limiter.label).cyan(), limiter.value));
        }
    }

    lines.push(String::new());
    lines.push(
        format!(
            " Updated {} · captured {}",
            format_clock_time(&view.updated_at),
            format_clock_time(&view.captured_at.with_timezone(&Local))
        )
        .dimmed()
        .to_string(),
    );

    lines.join("\n")
}

fn render_bar(lines: &mut Vec<String>, bar: &UsageBarView) {
    let severity = bar.severity();
    let colored_percent = color_by_severity(severity, &bar.used_label());
    let colored_bar = color_by_severity(severity, &format_usage_bar(bar.utilization, BAR_WIDTH));

    lines.push(format!(
        "  {}  {} {}",
        format!("{:<width$}", bar.label(), width = LABEL_WIDTH).cyan(),
        colored_percent,
        colored_bar
    ));

    if bar.resets_at.is_some() {
        let reset_line = format!("{} · {}", bar.countdown(), bar.reset_date());
        lines.push(format!(
            "  {}  {}",
            " ".repeat(LABEL_WIDTH),
            reset_line.dimmed()
        ));
    }
}

fn color_by_severity(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Low => text.blue(),
        Severity::Medium => text.yellow(),
        Severity::High => text.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::snapshot::Snapshot;

    fn make_view() -> DashboardView {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "usage": {
                    "five_hour": { "utilization": 95, "resets_at": "2099-01-01T00:00:00Z" },
                    "seven_day_sonnet": { "utilization": 10, "resets_at": null }
                },
                "rateLimits": {
                    "rate_limit_tier": "default_claude_pro",
                    "tier_model_rate_limiters": [
                        { "limiter": "concurrents", "value": 2, "model_group": "claude_opus_4" }
                    ]
                },
                "timestamp": "2026-10-18T09:30:00Z"
            }"#,
        )
        .unwrap();
        DashboardView::new(&snapshot, Local::now())
    }

    #[test]
    fn render_contains_bars_and_cards() {
        let output = render_dashboard(&make_view(), false);
        assert!(output.contains("claude pro"));
        assert!(output.contains("Current session"));
        assert!(output.contains("95% used"));
        assert!(output.contains("Sonnet only"));
        assert!(output.contains("Resets in"));
        assert!(output.contains("Opus 4"));
        assert!(output.contains("Concurrent: 2"));
        assert!(output.contains(" · captured "));
    }

    #[test]
    fn render_no_ansi_when_color_false() {
        let output = render_dashboard(&make_view(), false);
        assert!(!output.contains('\x1b'), "output should not contain ANSI codes");
    }

    #[test]
    fn window_without_reset_has_no_reset_line() {
        let output = render_dashboard(&make_view(), false);
        let sonnet_idx = output.lines().position(|l| l.contains("Sonnet only")).unwrap();
        let next = output.lines().nth(sonnet_idx + 1).unwrap_or_default();
        assert!(!next.contains("Resets"));
    }
}
