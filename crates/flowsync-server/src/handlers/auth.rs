//! Authentication-related handlers

use axum::extract::Request;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{get_user_email, AppState};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: String,
    /// Data source feeding the insight engine
    pub data_source: String,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(State(state): State<Arc<AppState>>, request: Request) -> Json<MeResponse> {
    let user = get_user_email(request.headers());

    let auth_method = match user.as_str() {
        "api-key" => "api_key",
        "local-dev" => "none",
        _ => "identity_header",
    };

    Json(MeResponse {
        user,
        auth_method: auth_method.to_string(),
        data_source: state.feed.source().kind().to_string(),
    })
}
