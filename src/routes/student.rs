//! Student resource routes.

use crate::handlers::student::{create, destroy, list, show, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list).post(create))
        .route(
            "/students/:id",
            get(show).put(update).patch(update).delete(destroy),
        )
        .with_state(state)
}
