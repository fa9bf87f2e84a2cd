//! Calendar handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState, SuccessResponse};
use flowsync_core::models::{Event, EventUpdate, NewEvent};

use super::{day_window, parse_instant, read_json};

/// Query parameters for listing events
///
/// Either a local `date`, or an explicit `from`/`to` range (RFC 3339).
/// With neither, today's events are returned.
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/events - List events for a day or range
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQuery>,
    request: Request,
) -> Result<Json<Vec<Event>>, AppError> {
    let user_email = get_user_email(request.headers());

    let (from, to) = match (params.from.as_deref(), params.to.as_deref()) {
        (Some(from), Some(to)) => {
            let from = parse_instant("from", from)?;
            let to = parse_instant("to", to)?;
            if to <= from {
                return Err(AppError::bad_request("'to' must be after 'from'"));
            }
            (from, to)
        }
        (None, None) => {
            let window = day_window(&state, params.date.as_deref())?;
            (window.start, window.end)
        }
        _ => return Err(AppError::bad_request("Both 'from' and 'to' are required")),
    };

    let events = state.db.list_events_between(&user_email, from, to)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("event"),
        None,
        Some(&format!("from={}, to={}, count={}", from, to, events.len())),
    )?;

    Ok(Json(events))
}

/// GET /api/events/today - List today's events in the reference time zone
pub async fn list_today_events(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Event>>, AppError> {
    let user_email = get_user_email(request.headers());

    let window = day_window(&state, None)?;
    let events = state.db.list_events_for_day(&user_email, &window)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("event"),
        None,
        Some(&format!("date={}, count={}", window.date, events.len())),
    )?;

    Ok(Json(events))
}

/// POST /api/events - Create an event
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Event>, AppError> {
    let user_email = get_user_email(request.headers());
    let new_event: NewEvent = read_json(request).await?;

    let event = state
        .db
        .create_event(&user_email, &new_event)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("event"),
        Some(event.id),
        Some(&format!("title={}, category={}", event.title, event.category)),
    )?;

    Ok(Json(event))
}

/// GET /api/events/:id - Get an event
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Event>, AppError> {
    let user_email = get_user_email(request.headers());

    let event = state
        .db
        .get_event(&user_email, id)?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("event"), Some(id), None)?;

    Ok(Json(event))
}

/// PATCH /api/events/:id - Partially update an event
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Event>, AppError> {
    let user_email = get_user_email(request.headers());
    let update: EventUpdate = read_json(request).await?;

    let event = state
        .db
        .update_event(&user_email, id, &update)
        .map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "update", Some("event"), Some(id), None)?;

    Ok(Json(event))
}

/// DELETE /api/events/:id - Delete an event
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_event(&user_email, id)? {
        return Err(AppError::not_found("Event not found"));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("event"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
