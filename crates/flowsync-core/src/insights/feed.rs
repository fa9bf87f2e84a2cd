//! Insight feed - fetches a day, evaluates it, and degrades gracefully
//!
//! When the snapshot cannot be fetched the engine is not run. The user's last
//! good result is served instead, or the default static insights if there is
//! none yet.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DayWindow;
use crate::source::{collect_snapshot, DataSource};

use super::engine::{default_insights, InsightEngine};
use super::types::Insight;

/// Where a feed result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrigin {
    /// Freshly evaluated
    Live,
    /// Last good result for this user
    Cached,
    /// Default static insights
    Fallback,
}

impl FeedOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedOrigin::Live => "live",
            FeedOrigin::Cached => "cached",
            FeedOrigin::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for FeedOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResult {
    pub insights: Vec<Insight>,
    pub origin: FeedOrigin,
}

/// Caller around the engine, one per process
pub struct InsightFeed {
    engine: InsightEngine,
    source: Arc<dyn DataSource>,
    last_good: RwLock<HashMap<String, Vec<Insight>>>,
}

impl InsightFeed {
    pub fn new(engine: InsightEngine, source: Arc<dyn DataSource>) -> Self {
        Self {
            engine,
            source,
            last_good: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    /// Produce the insight list for one user's day
    pub async fn refresh(&self, user_id: &str, window: &DayWindow, now: DateTime<Utc>) -> FeedResult {
        match collect_snapshot(self.source.as_ref(), user_id, window).await {
            Ok(snapshot) => {
                let insights = self.engine.evaluate(&snapshot, now);
                self.remember(user_id, &insights);
                FeedResult {
                    insights,
                    origin: FeedOrigin::Live,
                }
            }
            Err(e) => {
                tracing::warn!(user = user_id, error = %e, "Day snapshot unavailable, serving fallback insights");
                match self.cached(user_id) {
                    Some(insights) => FeedResult {
                        insights,
                        origin: FeedOrigin::Cached,
                    },
                    None => FeedResult {
                        insights: default_insights(),
                        origin: FeedOrigin::Fallback,
                    },
                }
            }
        }
    }

    fn remember(&self, user_id: &str, insights: &[Insight]) {
        match self.last_good.write() {
            Ok(mut cache) => {
                cache.insert(user_id.to_string(), insights.to_vec());
            }
            Err(e) => tracing::warn!(error = %e, "Insight cache lock poisoned, not caching"),
        }
    }

    fn cached(&self, user_id: &str) -> Option<Vec<Insight>> {
        match self.last_good.read() {
            Ok(cache) => cache.get(user_id).cloned(),
            Err(e) => {
                tracing::warn!(error = %e, "Insight cache lock poisoned");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::insights::types::RuleId;
    use crate::models::{utc_offset, Appointment, Event, Task};
    use crate::source::{DataSourceKind, StaticFixtureDataSource};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fixture day that can be switched to fail its task fetch
    struct FlakySource {
        failing: AtomicBool,
    }

    #[async_trait]
    impl DataSource for FlakySource {
        fn kind(&self) -> DataSourceKind {
            DataSourceKind::Fixture
        }

        async fn fetch_today_events(&self, user_id: &str, window: &DayWindow) -> Result<Vec<Event>> {
            StaticFixtureDataSource.fetch_today_events(user_id, window).await
        }

        async fn fetch_open_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::DataUnavailable("tasks offline".to_string()));
            }
            StaticFixtureDataSource.fetch_open_tasks(user_id).await
        }

        async fn fetch_pending_appointments(&self, _user_id: &str) -> Result<Vec<Appointment>> {
            Ok(vec![])
        }
    }

    fn window() -> DayWindow {
        DayWindow::for_date(
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            utc_offset(0).unwrap(),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
    }

    fn feed(failing: bool) -> InsightFeed {
        InsightFeed::new(
            InsightEngine::default(),
            Arc::new(FlakySource {
                failing: AtomicBool::new(failing),
            }),
        )
    }

    #[tokio::test]
    async fn test_fixture_day_is_live() {
        let feed = InsightFeed::new(InsightEngine::default(), Arc::new(StaticFixtureDataSource));
        let result = feed.refresh("u", &window(), now()).await;

        assert_eq!(result.origin, FeedOrigin::Live);
        // Two open high-priority tasks; meetings are an hour apart
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].rule, RuleId::HighPriorityLoad);
        assert!(result.insights[0].message.contains("2 high-priority tasks"));
    }

    #[tokio::test]
    async fn test_unavailable_without_cache_serves_defaults() {
        let feed = feed(true);
        let result = feed.refresh("u", &window(), now()).await;

        assert_eq!(result.origin, FeedOrigin::Fallback);
        assert_eq!(result.insights, default_insights());
    }

    #[tokio::test]
    async fn test_unavailable_serves_last_good_for_same_user() {
        let feed = feed(false);
        let live = feed.refresh("u", &window(), now()).await;
        assert_eq!(live.origin, FeedOrigin::Live);

        let flaky = FlakySource {
            failing: AtomicBool::new(true),
        };
        // Swap in a failing source while keeping the cache
        let feed = InsightFeed {
            source: Arc::new(flaky),
            ..feed
        };

        let cached = feed.refresh("u", &window(), now()).await;
        assert_eq!(cached.origin, FeedOrigin::Cached);
        assert_eq!(cached.insights, live.insights);

        let other = feed.refresh("someone-else", &window(), now()).await;
        assert_eq!(other.origin, FeedOrigin::Fallback);
    }
}
