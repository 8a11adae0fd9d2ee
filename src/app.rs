use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/schedule", get(handlers::get_schedule))
        .route("/api/habits/:id/completions", put(handlers::log_completion))
        .route(
            "/api/habits/:id/completions/:date",
            get(handlers::get_completion),
        )
        .route("/api/today", get(handlers::get_today))
        .route("/api/history", get(handlers::get_history))
        .route("/api/heatmap", get(handlers::get_heatmap))
        .route("/calendar.ics", get(handlers::calendar_ics))
        .with_state(state)
}
