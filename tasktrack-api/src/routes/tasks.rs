/// Task endpoints
///
/// All handlers run behind the JWT layer and act on the caller's tasks only.
///
/// # Endpoints
///
/// - `GET    /api/tasks?page&limit&search&status&category_id`
/// - `POST   /api/tasks`
/// - `GET    /api/tasks/stats`
/// - `GET    /api/tasks/:id`
/// - `PUT    /api/tasks/:id`
/// - `DELETE /api/tasks/:id`

use crate::{
    app::{AppState, AuthUser},
    error::ApiResult,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Local;
use tasktrack_shared::{
    models::task::{Task, TaskPayload},
    query::ListTasksParams,
    services::TaskStats,
};

/// Lists the caller's tasks, newest first
///
/// `page`/`limit` default to 1/10; `status=all`, `category_id=0` and an
/// empty `search` mean "no filter".
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListTasksParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_tasks(user.user_id, &params).await?;
    Ok(Json(tasks))
}

/// Creates a task; responds `201 Created`
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create_task(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get_task(user.user_id, id).await?;
    Ok(Json(task))
}

/// Updates present fields; a `subtasks` array replaces the whole set
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.update_task(user.user_id, id, payload).await?;
    Ok(Json(task))
}

/// Soft-deletes a task; responds `204 No Content`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_task(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dashboard counts and the 7 day completion chart, in server local time
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<TaskStats>> {
    let stats = state.stats.stats(user.user_id, Local::now()).await?;
    Ok(Json(stats))
}
