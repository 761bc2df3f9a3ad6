use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/toggle/:habit_id", post(handlers::toggle_form))
        .route("/api/habits", get(handlers::get_habits))
        .route("/api/today", get(handlers::get_today))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/toggle", post(handlers::toggle))
        .route("/api/status", post(handlers::set_status))
        .route("/api/stats/month", get(handlers::get_monthly_stats))
        .route("/api/stats/year", get(handlers::get_yearly_stats))
        .route("/api/stats/week", get(handlers::get_weekly_chart))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/heatmap", get(handlers::get_heatmap))
        .route("/api/sync", post(handlers::sync))
        .route("/api/data", delete(handlers::clear_data))
        .with_state(state)
}
