//! REST API
//!
//! ```text
//! GET /                                    - Liveness text
//! GET /health                              - Health check
//! GET /challenges                          - Challenge catalogue
//! GET /:challenge_id/:network/:address     - Grade a deployed contract
//! ```

pub mod errors;
pub mod routes;
pub mod validation;

use crate::submission::Submitter;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use errors::{ApiError, ErrorResponse};

/// Shared state for all handlers
pub struct ApiState {
    pub submitter: Submitter,
}

impl ApiState {
    pub fn new(submitter: Submitter) -> Self {
        Self { submitter }
    }
}

/// Create the router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health_check))
        .route("/challenges", get(routes::list_challenges))
        .route("/:challenge_id/:network/:address", get(routes::submit_challenge))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn run_server(state: Arc<ApiState>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Challenge grader listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}
