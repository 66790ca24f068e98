//! The HTTP API.
//!
//! Every request is handled independently: handlers compute the month window from the clock, run
//! their queries against the shared pool and return JSON. Nothing else is shared between requests.

mod handlers;
mod middleware;
mod routes;

use crate::db::Db;
use crate::error::{Error, ErrorType, Res};
use crate::month::MonthWindow;
use anyhow::Context;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

pub use handlers::{SuccessResponse, SummaryResponse};

/// Where "now" comes from when a handler computes the current month.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Clock {
    /// The local wall clock.
    #[default]
    System,
    /// A fixed day, so that the server always answers for that day's month.
    Fixed(NaiveDate),
}

impl Clock {
    pub fn month(&self) -> MonthWindow {
        match self {
            Clock::System => MonthWindow::current(),
            Clock::Fixed(day) => MonthWindow::containing(*day),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) db: Db,
    pub(crate) clock: Clock,
}

/// Builds the application router with CORS and request logging applied to every route.
pub(crate) fn app(db: Db, clock: Clock) -> Router {
    let state = AppState { db, clock };
    Router::new()
        .route("/health", get(|| async { "account-book is running" }))
        .merge(routes::api_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::cors))
        .layer(axum::middleware::from_fn(middleware::request_logger))
}

/// Serves the API on `addr` until Ctrl-C is received.
pub(crate) async fn run(db: Db, addr: SocketAddr) -> Res<()> {
    let app = app(db, Clock::System);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {addr}"))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for the shutdown signal: {e}");
            }
            info!("Graceful shutdown initiated");
        })
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.error_type() {
            ErrorType::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::StoreUnavailable
            | ErrorType::Config
            | ErrorType::Service
            | ErrorType::Overflow => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{self}");
        }
        let body = Json(json!({
            "error": self.error_type().as_str(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
