//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState};
use flowsync_core::insights::FeedResult;

use super::day_window;

/// Query parameters for the insight feed
#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    /// Local date (YYYY-MM-DD), today if absent
    pub date: Option<String>,
}

/// GET /api/insights - Evaluate the caller's day
///
/// Never fails because of the data source: when the day cannot be fetched the
/// last good result (or the default tip) is returned with `origin` set
/// accordingly.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
    request: Request,
) -> Result<Json<FeedResult>, AppError> {
    let user_email = get_user_email(request.headers());
    let window = day_window(&state, params.date.as_deref())?;

    let result = state.feed.refresh(&user_email, &window, Utc::now()).await;

    state.db.log_audit(
        &user_email,
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

    Ok(Json(result))
}
