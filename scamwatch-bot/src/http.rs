//! HTTP surface: health check and the public blocklist.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::get_bot_version;
use crate::repository::ReportRepository;

#[derive(Clone)]
pub struct HttpState {
    pub repository: Arc<dyn ReportRepository>,
}

#[derive(Debug, Serialize)]
pub struct Blocklist {
    pub targets: Vec<String>,
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "scamwatch",
        "version": get_bot_version(),
    }))
}

async fn blocklist_handler(
    State(state): State<HttpState>,
) -> Result<Json<Blocklist>, (StatusCode, Json<serde_json::Value>)> {
    match state.repository.distinct_approved_targets().await {
        Ok(targets) => Ok(Json(Blocklist { targets })),
        Err(e) => {
            error!("Failed to load blocklist: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to load blocklist" })),
            ))
        }
    }
}

pub fn router(repository: Arc<dyn ReportRepository>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/blocklist", get(blocklist_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(HttpState { repository })
}
