//! Booking catalog and slot handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, AppError, AppState};
use flowsync_core::booking::{available_slots, find_service, Service, TimeSlot, SERVICES};

use super::day_window;

/// Query parameters for slot lookup
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    /// Local date (YYYY-MM-DD), today if absent
    pub date: Option<String>,
    /// Service id or name
    pub service: String,
}

/// Slots for one service on one day
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub service: Service,
    pub slots: Vec<TimeSlot>,
}

/// GET /api/services - List the bookable services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Service>>, AppError> {
    let user_email = get_user_email(request.headers());

    state
        .db
        .log_audit(&user_email, "list", Some("service"), None, None)?;

    Ok(Json(SERVICES.to_vec()))
}

/// GET /api/booking/slots - Candidate start times for a service
pub async fn get_booking_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SlotQuery>,
    request: Request,
) -> Result<Json<SlotsResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let service = find_service(&params.service)
        .ok_or_else(|| AppError::bad_request(&format!("Unknown service: {}", params.service)))?;
    let window = day_window(&state, params.date.as_deref())?;

    let events = state.db.list_events_for_day(&user_email, &window)?;
    let slots = available_slots(
        &window,
        state.offset,
        service.duration_minutes,
        &events,
        &state.config.app.calendar,
        Utc::now(),
    );

    state.db.log_audit(
        &user_email,
        "list",
        Some("booking_slot"),
        None,
        Some(&format!(
            "date={}, service={}, available={}",
            window.date,
            service.id,
            slots.iter().filter(|s| s.available).count()
        )),
    )?;

    Ok(Json(SlotsResponse {
        date: window.date,
        service: *service,
        slots,
    }))
}
