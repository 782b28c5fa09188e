pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::bias::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/bias/demographic",
            post(handlers::handle_demographic),
        )
        .route("/api/v1/bias/scores", post(handlers::handle_scores))
        .route("/api/v1/bias/text", post(handlers::handle_text))
        .route(
            "/api/v1/bias/comprehensive",
            post(handlers::handle_comprehensive),
        )
        .route("/api/v1/bias/insights", post(handlers::handle_insights))
        .with_state(state)
}
