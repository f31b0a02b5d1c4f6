// rest/routes/tasks.rs — owner-scoped task routes.
//
// The AuthUser extractor runs before any handler body, so every operation
// below already holds a verified identity to scope its queries with.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::rest::error::ApiError;
use crate::rest::extract::AuthUser;
use crate::tasks::model::{TaskFilter, TaskRow, TaskStatus};
use crate::AppContext;

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<TaskRow>>, ApiError> {
    let tasks = ctx.tasks.list(&filter, &user.id).await?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskRow>), ApiError> {
    let task = ctx
        .tasks
        .create(&body.title, &body.description, &user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskRow>, ApiError> {
    let task = ctx.tasks.get(&id, &user.id).await?;
    Ok(Json(task))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

pub async fn update_task_status(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<TaskRow>, ApiError> {
    let task = ctx.tasks.update_status(&id, body.status, &user.id).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.tasks.delete(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
