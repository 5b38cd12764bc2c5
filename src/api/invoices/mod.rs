// Invoice resource: creation with discount/tax pricing plus CRUD.

pub mod handlers;
pub mod models;
pub mod validation;

pub use handlers::*;
pub use models::*;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use crate::state::AppState;

/// Routes mounted under `/invoices`.
pub fn create_invoice_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(list_invoices).post(create_invoice).patch(patch_invoice),
        )
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/customer/:customerId", get(list_customer_invoices))
}
