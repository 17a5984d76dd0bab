//! HTTP surface: REST endpoints for the wizard, copy assembly, forms,
//! CRM, and email campaigns.

pub mod content;
pub mod crm;
pub mod emails;
pub mod forms;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::content::ContentGenerator;
use crate::error::DatabaseError;
use crate::mailer::Mailer;
use crate::store::Database;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub generator: Arc<dyn ContentGenerator>,
    /// `None` runs the mailer in simulated mode.
    pub mailer: Option<Arc<Mailer>>,
    /// Overrides generation pacing when set (tests pass zero).
    pub pace_override: Option<Duration>,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(content::routes())
        .merge(forms::routes())
        .merge(crm::routes())
        .merge(emails::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// JSON error payload with the given status.
pub(crate) fn error_json(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

/// Map a database error to a response: NotFound → 404, the rest → 500.
pub(crate) fn db_error(e: DatabaseError) -> (StatusCode, Json<serde_json::Value>) {
    match e {
        DatabaseError::NotFound { entity, id } => error_json(
            StatusCode::NOT_FOUND,
            format!("{entity} {id} not found"),
        ),
        other => {
            tracing::error!(error = %other, "Database operation failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
