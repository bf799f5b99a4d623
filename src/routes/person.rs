//! Person resource routes.

use crate::handlers::person::{create_person, get_person};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn person_routes(state: AppState) -> Router {
    Router::new()
        .route("/person", post(create_person))
        .route("/person/:id", get(get_person))
        .with_state(state)
}
