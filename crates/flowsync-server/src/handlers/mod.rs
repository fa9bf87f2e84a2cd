//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod appointments;
pub mod audit;
pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod events;
pub mod insights;
pub mod tasks;

// Re-export all handlers for use in router
pub use appointments::*;
pub use audit::*;
pub use auth::*;
pub use booking::*;
pub use dashboard::*;
pub use events::*;
pub use insights::*;
pub use tasks::*;

use axum::extract::Request;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;

use flowsync_core::models::DayWindow;

use crate::{AppError, AppState, MAX_BODY_SIZE};

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Day window for an optional `YYYY-MM-DD` query value (today if absent)
pub(crate) fn day_window(state: &AppState, date: Option<&str>) -> Result<DayWindow, AppError> {
    match date {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                AppError::bad_request(&format!("Invalid date: {}. Expected YYYY-MM-DD", s))
            })?;
            Ok(DayWindow::for_date(date, state.offset))
        }
        None => Ok(DayWindow::containing(Utc::now(), state.offset)),
    }
}

/// Parse an RFC 3339 timestamp query value
pub(crate) fn parse_instant(name: &str, s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::bad_request(&format!("Invalid {}: {}. Expected RFC 3339", name, s)))
}
