//! Dashboard handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::{get_user_email, AppError, AppState};
use flowsync_core::insights::{FeedOrigin, Insight};
use flowsync_core::models::{BoardSummary, Event};

use super::day_window;

/// Everything the home screen shows in one call
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: String,
    pub date: NaiveDate,
    pub tasks: BoardSummary,
    pub events: Vec<Event>,
    pub insights: Vec<Insight>,
    pub insight_origin: FeedOrigin,
}

/// GET /api/dashboard - Today's overview
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<DashboardResponse>, AppError> {
    let user_email = get_user_email(request.headers());
    let window = day_window(&state, None)?;

    let tasks = state.db.board_summary(&user_email)?;
    let events = state.db.list_events_for_day(&user_email, &window)?;
    let feed = state.feed.refresh(&user_email, &window, Utc::now()).await;

    state
        .db
        .log_audit(&user_email, "view", Some("dashboard"), None, None)?;

    Ok(Json(DashboardResponse {
        user: user_email,
        date: window.date,
        tasks,
        events,
        insights: feed.insights,
        insight_origin: feed.origin,
    }))
}
