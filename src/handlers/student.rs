//! Student handlers: list, create, show, update, destroy.

use crate::error::AppError;
use crate::response::{success, success_message, success_with_message};
use crate::service::student::NOT_FOUND;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// Ids that are not integers can never match a record.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::NotFound(NOT_FOUND.into()))
}

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<HashMap<String, Value>, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let students = state.students.list().await?;
    Ok(success_with_message(StatusCode::OK, "Api works", students))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let student = state.students.create(&body).await?;
    Ok(success_with_message(StatusCode::CREATED, "Saved Successfully", student))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let student = state.students.show(id).await?;
    Ok(success(student))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let student = state.students.update(id, &body).await?;
    Ok(success_with_message(
        StatusCode::OK,
        "Student data updated successfully",
        student,
    ))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.students.destroy(id).await?;
    Ok(success_message("Student deleted successfully"))
}
