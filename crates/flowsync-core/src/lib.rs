//! FlowSync Core Library
//!
//! Shared functionality for the FlowSync productivity planner:
//! - Database access and migrations (tasks, events, appointments, audit log)
//! - Data sources supplying one user's day (SQLite or a static fixture)
//! - Rule-based insight engine and the feed that degrades to cached insights
//! - Booking catalog and slot availability
//! - TOML configuration with embedded defaults

pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod source;

pub use booking::{available_slots, find_service, Service, TimeSlot, SERVICES};
pub use config::{CalendarConfig, Config, InsightConfig};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use insights::{FeedOrigin, FeedResult, Insight, InsightEngine, InsightFeed, InsightKind, RuleId, Snapshot};
pub use source::{
    build_source, collect_snapshot, DataSource, DataSourceKind, LiveDataSource,
    StaticFixtureDataSource,
};
