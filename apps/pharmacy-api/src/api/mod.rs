//! Routes owned by the binary itself, plus the pharmacy domain router

pub mod health;
pub mod home;

use std::sync::Arc;

use axum::Router;
use domain_pharmacy::{MongoStore, handlers};

use crate::state::AppState;

/// Everything served under `/api`; `axum_helpers::create_router` adds the prefix
pub fn routes(state: &AppState, store: MongoStore) -> Router {
    handlers::router(Arc::new(store)).merge(health::router(state.clone()))
}
