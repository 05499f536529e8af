use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:name",
            get(handlers::get_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:name/complete", post(handlers::complete_habit))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
