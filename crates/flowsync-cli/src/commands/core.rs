//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the config file plus environment and flag overrides
//! - `day_window` - Parse a --date flag into a local day window
//! - `cmd_init` - Initialize the database
//! - `cmd_config` - Show the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use flowsync_core::config::default_config_path;
use flowsync_core::models::DayWindow;
use flowsync_core::{Config, DataSourceKind, Database};

/// Environment override for the insight data source
pub const DATA_SOURCE_ENV: &str = "FLOWSYNC_DATA_SOURCE";

/// Environment override for the reference time zone (minutes east of UTC)
pub const UTC_OFFSET_ENV: &str = "FLOWSYNC_UTC_OFFSET_MINUTES";

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load config, then apply environment and flag overrides
///
/// Data source priority: --source flag > FLOWSYNC_DATA_SOURCE > config file.
/// FLOWSYNC_UTC_OFFSET_MINUTES replaces the configured offset.
pub fn load_config(path: Option<&Path>, source: Option<&str>) -> Result<Config> {
    let mut config = Config::load(path).context("Failed to load configuration")?;

    if let Some(raw) = std::env::var(UTC_OFFSET_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
    {
        config.calendar.utc_offset_minutes = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {}", UTC_OFFSET_ENV, raw))?;
        config.calendar.offset()?;
    }

    let env_source = std::env::var(DATA_SOURCE_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty());
    if let Some(kind) = source.map(str::to_string).or(env_source) {
        config.data_source = parse_source(&kind)?;
    }

    Ok(config)
}

pub fn parse_source(kind: &str) -> Result<DataSourceKind> {
    kind.parse::<DataSourceKind>()
        .map_err(|e: String| anyhow::anyhow!(e))
}

/// Local day window for `--date`, or today in the configured offset
pub fn day_window(config: &Config, date: Option<&str>) -> Result<DayWindow> {
    let offset = config.calendar.offset()?;
    match date {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .context("Invalid --date format (use YYYY-MM-DD)")?;
            Ok(DayWindow::for_date(date, offset))
        }
        None => Ok(DayWindow::containing(Utc::now(), offset)),
    }
}

/// Parse an RFC 3339 timestamp from a flag
pub fn parse_instant(flag: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid --{} (use RFC 3339, e.g. 2025-03-01T09:00:00Z)", flag))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if db.is_encrypted()? {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }

    println!("✅ Database initialized at {}", db.path());
    println!();
    println!("Next steps:");
    println!("  1. Add a task: flowsync tasks add \"Review Q4 budget\" --priority high");
    println!("  2. See today's insights: flowsync insights");
    println!("  3. Start web UI: flowsync serve");

    Ok(())
}

pub fn cmd_config(config: &Config, path: Option<&Path>) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    println!("   ─────────────────────────────");
    match path {
        Some(p) => println!("   File: {}", p.display()),
        None => match default_config_path() {
            Some(p) if p.exists() => println!("   File: {}", p.display()),
            _ => println!("   File: (built-in defaults)"),
        },
    }
    println!("   Data source: {}", config.data_source);
    println!();
    println!("   Insights");
    println!(
        "     Back-to-back gap:   {} min",
        config.insights.back_to_back_gap.num_minutes()
    );
    println!(
        "     Meeting-heavy day:  more than {} meetings",
        config.insights.meeting_heavy_threshold
    );
    println!();
    println!("   Calendar");
    println!(
        "     UTC offset:         {:+} min",
        config.calendar.utc_offset_minutes
    );
    println!(
        "     Workday:            {:02}:00 - {:02}:00",
        config.calendar.workday_start_hour, config.calendar.workday_end_hour
    );
    println!("     Slot spacing:       {} min", config.calendar.slot_minutes);

    Ok(())
}
