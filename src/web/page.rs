//! Server-rendered dashboard.
//!
//! `/` is a shell whose container asks htmx to load `/dashboard` on page load
//! and then every refresh interval. `/dashboard` always answers 200 so htmx
//! swaps the error panel in too; a dead server is handled client side.

use axum::extract::State;
use axum::response::Html;
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::sync::Arc;

use super::WebState;
use crate::core::dashboard::{DashboardView, RateLimitCard, UsageBarView};
use crate::core::formatter::format_clock_time;
use crate::core::models::snapshot::Snapshot;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";
const STYLESHEET: &str = include_str!("assets/dashboard.css");
pub const TITLE: &str = "Claude Usage Dashboard";

/// Swap in the offline panel when the request never reached the server.
const OFFLINE_SCRIPT: &str = r#"document.body.addEventListener('htmx:sendError', function () {
  var panel = document.getElementById('offline-panel');
  document.getElementById('dashboard').innerHTML = panel.innerHTML;
});"#;

pub async fn index(State(state): State<Arc<WebState>>) -> Html<String> {
    Html(layout(state.refresh_secs).into_string())
}

pub async fn dashboard(State(state): State<Arc<WebState>>) -> Html<String> {
    let markup = match state.source.load().await {
        Ok(snapshot) => render_snapshot(&snapshot, state.refresh_secs),
        Err(e) => {
            tracing::warn!("GET /dashboard: {}", e);
            error_panel(&e.to_string())
        }
    };
    Html(markup.into_string())
}

pub fn layout(refresh_secs: u64) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (TITLE) }
                script src=(HTMX_SRC) {}
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                main.container {
                    h1 { (TITLE) }
                    div id="dashboard"
                        hx-get="/dashboard"
                        hx-trigger={ "load, every " (refresh_secs) "s" }
                        hx-swap="innerHTML" {
                        p.loading { "Loading…" }
                    }
                }
                template id="offline-panel" {
                    div.panel.offline {
                        h2 { "Dashboard server unreachable" }
                        p { "The page could not reach the local server. It will retry automatically." }
                    }
                }
                script { (PreEscaped(OFFLINE_SCRIPT)) }
            }
        }
    }
}

pub fn render_snapshot(snapshot: &Snapshot, refresh_secs: u64) -> Markup {
    render_view(&DashboardView::new(snapshot, Local::now()), refresh_secs)
}

pub fn render_view(view: &DashboardView, refresh_secs: u64) -> Markup {
    html! {
        p.status-line {
            span.live-dot {}
            "Live · " (format_clock_time(&view.updated_at))
            " · " span.captured { "captured " (format_clock_time(&view.captured_at.with_timezone(&Local))) }
            @if !view.tier.is_empty() {
                " · " span.tier { (view.tier) }
            }
        }
        section.bars {
            @for bar in &view.bars {
                (usage_bar(bar))
            }
        }
        @if !view.cards.is_empty() {
            section.cards {
                h2 { "Rate limits" }
                div.card-grid {
                    @for card in &view.cards {
                        (rate_limit_card(card))
                    }
                }
            }
        }
        footer {
            "Auto-refreshes every " (refresh_secs) "s · Not an official API"
        }
    }
}

fn usage_bar(bar: &UsageBarView) -> Markup {
    let severity = bar.severity().css_class();
    html! {
        div.usage-row {
            div.usage-head {
                div {
                    div.label { (bar.label()) }
                    div.subtitle { (bar.subtitle()) }
                }
                div class={ "pct " (severity) } { (bar.used_label()) }
            }
            div.bar-track {
                div class={ "bar-fill " (severity) }
                    style={ "width: " (format!("{:.1}", bar.fill_percent())) "%" } {}
            }
            div.reset {
                span.countdown { (bar.countdown()) }
                span.reset-date { (bar.reset_date()) }
            }
        }
    }
}

fn rate_limit_card(card: &RateLimitCard) -> Markup {
    html! {
        div.card data-model-group=(card.model_group) {
            h3 { (card.title) }
            @for limiter in &card.limiters {
                div.limiter {
                    span { (limiter.label) ":" }
                    " "
                    span.value { (limiter.value) }
                }
            }
        }
    }
}

pub fn error_panel(message: &str) -> Markup {
    html! {
        div.panel.error {
            h2 { "Unable to load usage data" }
            p.error-message { (message) }
            p { "Add your credentials to " code { ".env" } " in the working directory:" }
            pre {
                "CLAUDE_SESSION_COOKIE=\"sessionKey=sk-ant-...\"\n"
                "CLAUDE_ORG_ID=\"your-org-uuid\""
            }
            p {
                "Run " code { "cud refresh-cookie" } " to copy the cookie from Chrome, then start "
                code { "cud poll" } "."
            }
        }
    }
}
