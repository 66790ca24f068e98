use crate::server::{handlers, AppState};
use axum::routing::get;
use axum::Router;

pub(super) fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/api/expenses/{user}", get(handlers::list_user_expenses))
        .route("/api/summary", get(handlers::summary))
        .route("/api/summary/table", get(handlers::summary_table))
}
