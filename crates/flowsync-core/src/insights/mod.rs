//! Insight Engine - advisory messages about the user's day
//!
//! The engine runs a fixed sequence of independent rules over a snapshot of
//! one day (today's events, open tasks, pending appointments) and returns an
//! ordered list of insights. Evaluation is pure and cannot fail.
//!
//! ## Rules (in order)
//!
//! 1. **Back-to-back meetings** - adjacent meetings closer than the configured gap
//! 2. **High-priority load** - open tasks marked high priority
//! 3. **Overdue tasks** - open tasks past their due time
//! 4. **Pending appointments** - booking requests awaiting review
//! 5. **Meeting-heavy day** - more meetings than the configured threshold
//!
//! If none fire, a single "well-balanced day" tip is returned.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flowsync_core::insights::{InsightEngine, InsightFeed};
//!
//! let feed = InsightFeed::new(InsightEngine::new(config.insights), source);
//! let result = feed.refresh(user, &window, Utc::now()).await;
//! ```

pub mod appointments;
pub mod engine;
pub mod feed;
pub mod meetings;
pub mod types;
pub mod workload;

pub use appointments::PendingAppointmentsRule;
pub use engine::{default_insights, EvaluationContext, InsightEngine, Rule};
pub use feed::{FeedOrigin, FeedResult, InsightFeed};
pub use meetings::{BackToBackMeetingsRule, MeetingHeavyDayRule};
pub use types::{Insight, InsightKind, RuleId, Snapshot};
pub use workload::{HighPriorityLoadRule, OverdueTasksRule};
