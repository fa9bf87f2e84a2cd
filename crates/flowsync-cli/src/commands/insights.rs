//! Insight and daily overview commands

use anyhow::Result;
use chrono::Utc;
use flowsync_core::db::Database;
use flowsync_core::models::DayWindow;
use flowsync_core::{
    build_source, Config, FeedOrigin, FeedResult, Insight, InsightEngine, InsightFeed, InsightKind,
};

use super::{day_window, print_events};

fn kind_icon(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Tip => "💡",
        InsightKind::Warning => "⚠️ ",
        InsightKind::Suggestion => "✨",
        InsightKind::Alert => "🚨",
    }
}

/// Evaluate one day through the configured data source
pub async fn evaluate_day(
    db: &Database,
    user: &str,
    config: &Config,
    window: &DayWindow,
) -> FeedResult {
    let source = build_source(config.data_source, db.clone());
    let feed = InsightFeed::new(InsightEngine::new(config.insights.clone()), source);
    feed.refresh(user, window, Utc::now()).await
}

fn print_insights(insights: &[Insight]) {
    for insight in insights {
        println!("   {} {}", kind_icon(insight.kind), insight.message);
        if let Some(action) = &insight.action {
            println!("      → {}", action);
        }
    }
}

fn print_origin(origin: FeedOrigin) {
    match origin {
        FeedOrigin::Live => {}
        FeedOrigin::Cached => println!("   (showing cached insights, data source unavailable)"),
        FeedOrigin::Fallback => println!("   (data source unavailable, showing default tips)"),
    }
}

pub async fn cmd_insights(
    db: &Database,
    user: &str,
    config: &Config,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let window = day_window(config, date)?;
    let result = evaluate_day(db, user, config, &window).await;

    db.log_audit(
        user,
        "list",
        Some("insight"),
        None,
        Some(&format!(
            "date={}, origin={}, count={}",
            window.date,
            result.origin,
            result.insights.len()
        )),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("🧭 Insights for {} ({})", window.date, config.data_source);
    println!("   ─────────────────────────────────────────────");
    print_insights(&result.insights);
    print_origin(result.origin);

    Ok(())
}

pub async fn cmd_today(
    db: &Database,
    user: &str,
    config: &Config,
    date: Option<&str>,
) -> Result<()> {
    let window = day_window(config, date)?;
    let offset = config.calendar.offset()?;

    let summary = db.board_summary(user)?;
    let events = db.list_events_for_day(user, &window)?;
    let pending = db.list_pending_appointments(user)?;
    let result = evaluate_day(db, user, config, &window).await;

    db.log_audit(user, "view", Some("dashboard"), None, Some("cli"))?;

    println!();
    println!("📊 FlowSync - {}", window.date);
    println!("   ─────────────────────────────");
    println!(
        "   Board: {} to do · {} in progress · {} in review · {} done",
        summary.todo, summary.in_progress, summary.review, summary.done
    );
    if summary.open_high_priority > 0 {
        println!("   🔴 {} open high-priority", summary.open_high_priority);
    }
    if !pending.is_empty() {
        println!("   ⏳ {} appointment requests pending", pending.len());
    }

    println!();
    println!("🗓️  Calendar");
    if events.is_empty() {
        println!("   Nothing scheduled");
    } else {
        print_events(&events, offset);
    }

    println!();
    println!("🧭 Insights");
    print_insights(&result.insights);
    print_origin(result.origin);

    Ok(())
}
