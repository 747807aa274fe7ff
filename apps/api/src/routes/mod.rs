pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::state::AppState;
use crate::stats::handlers as stats;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ping", get(health::ping_handler))
        // Resume API
        .route(
            "/resume/analyse",
            post(analysis::handle_analyse).layer(upload_limit),
        )
        .route("/resume/stats", get(stats::handle_stats))
        // User API
        .route("/user/profile", get(users::handle_profile))
        .route("/user/update-profile", put(users::handle_update_profile))
        .with_state(state)
}
