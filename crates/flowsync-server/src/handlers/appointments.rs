//! Appointment handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState, SuccessResponse};
use flowsync_core::booking::find_service;
use flowsync_core::models::{Appointment, AppointmentStatus, NewAppointment};

use super::read_json;

/// Query parameters for listing appointments
#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    /// Filter by status (pending, confirmed, declined)
    pub status: Option<String>,
}

/// Request body for a booking request
///
/// When `duration_minutes` is omitted and `service` names a catalog entry,
/// the catalog duration is used.
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub service: String,
    pub requested_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// GET /api/appointments - List appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AppointmentQuery>,
    request: Request,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let user_email = get_user_email(request.headers());

    let status = params
        .status
        .as_deref()
        .map(|s| {
            s.parse::<AppointmentStatus>().map_err(|_| {
                AppError::bad_request(&format!(
                    "Invalid status: {}. Valid: pending, confirmed, declined",
                    s
                ))
            })
        })
        .transpose()?;

    let appointments = state.db.list_appointments(&user_email, status)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("appointment"),
        None,
        Some(&format!(
            "status={:?}, count={}",
            params.status,
            appointments.len()
        )),
    )?;

    Ok(Json(appointments))
}

/// POST /api/appointments - Record a booking request
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Appointment>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: CreateAppointmentRequest = read_json(request).await?;

    // Catalog entries are stored under their display name
    let catalog = find_service(&req.service);
    let new_appointment = NewAppointment {
        client_name: req.client_name,
        client_email: req.client_email,
        client_phone: req.client_phone,
        service: catalog.map(|s| s.name.to_string()).unwrap_or(req.service),
        requested_at: req.requested_at,
        duration_minutes: req
            .duration_minutes
            .or_else(|| catalog.map(|s| s.duration_minutes)),
        notes: req.notes,
    };

    let appointment = state
        .db
        .create_appointment(&user_email, &new_appointment)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("appointment"),
        Some(appointment.id),
        Some(&format!("service={}", appointment.service)),
    )?;

    Ok(Json(appointment))
}

/// GET /api/appointments/:id - Get an appointment
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Appointment>, AppError> {
    let user_email = get_user_email(request.headers());

    let appointment = state
        .db
        .get_appointment(&user_email, id)?
        .ok_or_else(|| AppError::not_found("Appointment not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("appointment"), Some(id), None)?;

    Ok(Json(appointment))
}

/// POST /api/appointments/:id/confirm - Confirm and place on the calendar
pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Appointment>, AppError> {
    let user_email = get_user_email(request.headers());

    let appointment = state
        .db
        .confirm_appointment(&user_email, id)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "confirm",
        Some("appointment"),
        Some(id),
        appointment
            .event_id
            .map(|event_id| format!("event_id={}", event_id))
            .as_deref(),
    )?;

    Ok(Json(appointment))
}

/// POST /api/appointments/:id/decline - Decline a pending request
pub async fn decline_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Appointment>, AppError> {
    let user_email = get_user_email(request.headers());

    let appointment = state
        .db
        .decline_appointment(&user_email, id)
        .map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "decline", Some("appointment"), Some(id), None)?;

    Ok(Json(appointment))
}

/// DELETE /api/appointments/:id - Delete an appointment
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_appointment(&user_email, id)? {
        return Err(AppError::not_found("Appointment not found"));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("appointment"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
