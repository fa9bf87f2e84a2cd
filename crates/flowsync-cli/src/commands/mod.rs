//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, config) and shared utilities (open_db, load_config)
//! - `tasks` - Task board commands (list, add, move, delete)
//! - `events` - Calendar commands (list, add, delete)
//! - `appointments` - Booking request commands (list, request, confirm, decline)
//! - `booking` - Service catalog and slot lookup
//! - `insights` - Insight evaluation and the daily overview
//! - `serve` - Web server command

pub mod appointments;
pub mod booking;
pub mod core;
pub mod events;
pub mod insights;
pub mod serve;
pub mod tasks;

// Re-export command functions for main.rs
pub use appointments::*;
pub use booking::*;
pub use core::*;
pub use events::*;
pub use insights::*;
pub use serve::*;
pub use tasks::*;

use chrono::{DateTime, FixedOffset, Utc};

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Wall-clock "HH:MM" in the configured offset
pub fn local_time(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%H:%M").to_string()
}
