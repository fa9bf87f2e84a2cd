//! Task board handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, AppError, AppState, SuccessResponse};
use flowsync_core::models::{BoardSummary, NewTask, Task, TaskStatus, TaskUpdate};

use super::read_json;

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    /// Filter by board column (todo, in_progress, review, done)
    pub status: Option<String>,
}

/// Request body for moving a task between columns
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub status: String,
}

fn parse_status(s: &str) -> Result<TaskStatus, AppError> {
    s.parse().map_err(|_| {
        AppError::bad_request(&format!(
            "Invalid status: {}. Valid: todo, in_progress, review, done",
            s
        ))
    })
}

/// GET /api/tasks - List tasks in board order
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TaskQuery>,
    request: Request,
) -> Result<Json<Vec<Task>>, AppError> {
    let user_email = get_user_email(request.headers());

    let status = params.status.as_deref().map(parse_status).transpose()?;
    let tasks = state.db.list_tasks(&user_email, status)?;

    // Audit log - read access
    state.db.log_audit(
        &user_email,
        "list",
        Some("task"),
        None,
        Some(&format!("status={:?}, count={}", params.status, tasks.len())),
    )?;

    Ok(Json(tasks))
}

/// POST /api/tasks - Create a task
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Task>, AppError> {
    let user_email = get_user_email(request.headers());
    let new_task: NewTask = read_json(request).await?;

    let task = state
        .db
        .create_task(&user_email, &new_task)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("task"),
        Some(task.id),
        Some(&format!("title={}", task.title)),
    )?;

    Ok(Json(task))
}

/// GET /api/tasks/:id - Get a task
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Task>, AppError> {
    let user_email = get_user_email(request.headers());

    let task = state
        .db
        .get_task(&user_email, id)?
        .ok_or_else(|| AppError::not_found("Task not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("task"), Some(id), None)?;

    Ok(Json(task))
}

/// PATCH /api/tasks/:id - Partially update a task
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Task>, AppError> {
    let user_email = get_user_email(request.headers());
    let update: TaskUpdate = read_json(request).await?;

    let task = state
        .db
        .update_task(&user_email, id, &update)
        .map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "update", Some("task"), Some(id), None)?;

    Ok(Json(task))
}

/// POST /api/tasks/:id/move - Move a task to another column
pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Task>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: MoveTaskRequest = read_json(request).await?;
    let status = parse_status(&req.status)?;

    let task = state
        .db
        .move_task(&user_email, id, status)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "move",
        Some("task"),
        Some(id),
        Some(&format!("status={}", status)),
    )?;

    Ok(Json(task))
}

/// DELETE /api/tasks/:id - Delete a task
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_task(&user_email, id)? {
        return Err(AppError::not_found("Task not found"));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("task"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/tasks/summary - Task counts per column
pub async fn get_task_summary(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BoardSummary>, AppError> {
    let user_email = get_user_email(request.headers());

    let summary = state.db.board_summary(&user_email)?;

    state
        .db
        .log_audit(&user_email, "view", Some("task_summary"), None, None)?;

    Ok(Json(summary))
}
