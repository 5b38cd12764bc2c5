pub mod invoices;

use axum::{
    extract::State,
    routing::get,
    Router,
};
use shared::ApiResponse;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;
use invoices::HealthStatus;

/// Liveness probe. Always answers 200; the body reports store reachability.
pub async fn health_check_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResponse<HealthStatus> {
    let database = match &state.database {
        Some(db) => match db.health_check().await {
            Ok(()) => "up",
            Err(e) => {
                warn!("Database health check failed: {}", e);
                "down"
            }
        },
        None => "disabled",
    };

    ApiResponse::ok(
        "Service is healthy",
        HealthStatus {
            service: env!("CARGO_PKG_NAME").to_string(),
            store: state.store_backend.to_string(),
            database: database.to_string(),
        },
    )
}

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/invoices", invoices::create_invoice_router())
}
