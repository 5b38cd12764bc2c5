use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use shared::{ApiResponse, AppError, Result};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::invoices::{
    models::{
        InvoiceListQuery, InvoiceListing, InvoiceRequest, PatchInvoiceRequest,
        UpdateInvoiceRequest,
    },
    validation::{
        parse_page, parse_path_id, validate_create_request, validate_patch_request,
        validate_update_request,
    },
};
use crate::domains::invoices::{CreatedInvoice, Invoice, InvoiceWithParties};
use crate::state::AppState;

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

// ============================================================================
// HANDLER FUNCTIONS
// ============================================================================

/// POST /invoices
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<InvoiceRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedInvoice>> {
    let request_id = request_id(&headers);
    let draft = validate_create_request(json_body(body)?)?;

    info!(
        request_id = %request_id,
        shop_id = draft.shop_id,
        customer_id = draft.customer_id,
        "Creating invoice"
    );

    let created = state.invoice_service.create_invoice(draft).await?;

    info!(
        request_id = %request_id,
        invoice_id = created.invoice_id,
        "Invoice created"
    );
    Ok(ApiResponse::created("Invoice created successfully", created))
}

/// GET /invoices/:id
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<InvoiceWithParties>> {
    let invoice_id = parse_path_id(&id, "id")?;
    debug!("Fetching invoice {}", invoice_id);

    let invoice = state.invoice_service.get_invoice(invoice_id).await?;
    Ok(ApiResponse::ok("Invoice fetched successfully", invoice))
}

/// GET /invoices
///
/// With `status` the result is the filtered set; otherwise a page of invoices.
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<InvoiceListQuery>, QueryRejection>,
) -> Result<ApiResponse<InvoiceListing>> {
    let Query(query) = query.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    if let Some(status) = query.status.as_deref() {
        debug!("Filtering invoices by status '{}'", status);
        let invoices = state.invoice_service.filter_by_status(status).await?;
        return Ok(ApiResponse::ok(
            "Invoices fetched successfully",
            InvoiceListing::Filtered(invoices),
        ));
    }

    let page = parse_page(&query)?;
    debug!(
        "Listing invoices: limit {}, page {}",
        page.limit, page.page_number
    );
    let invoices = state.invoice_service.list_invoices(page).await?;
    Ok(ApiResponse::ok(
        "Invoices fetched successfully",
        InvoiceListing::Page(invoices),
    ))
}

/// GET /invoices/customer/:customerId
pub async fn list_customer_invoices(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<ApiResponse<Vec<Invoice>>> {
    let customer_id = parse_path_id(&customer_id, "customerId")?;
    let invoices = state.invoice_service.list_by_customer(customer_id).await?;
    Ok(ApiResponse::ok("Invoices fetched successfully", invoices))
}

/// PUT /invoices/:invoiceid
pub async fn update_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateInvoiceRequest>, JsonRejection>,
) -> Result<ApiResponse<InvoiceWithParties>> {
    let request_id = request_id(&headers);
    let invoice_id = parse_path_id(&id, "invoiceid")?;
    let changes = validate_update_request(json_body(body)?)?;

    info!(request_id = %request_id, invoice_id, "Updating invoice");
    let invoice = state
        .invoice_service
        .update_invoice(invoice_id, changes)
        .await?;
    Ok(ApiResponse::ok("Invoice updated successfully", invoice))
}

/// PATCH /invoices
pub async fn patch_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<PatchInvoiceRequest>, JsonRejection>,
) -> Result<ApiResponse<InvoiceWithParties>> {
    let request_id = request_id(&headers);
    let (invoice_id, changes) = validate_patch_request(json_body(body)?)?;

    info!(request_id = %request_id, invoice_id, "Patching invoice");
    let invoice = state
        .invoice_service
        .patch_invoice(invoice_id, changes)
        .await?;
    Ok(ApiResponse::ok("Invoice updated successfully", invoice))
}

/// DELETE /invoices/:id
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let request_id = request_id(&headers);
    let invoice_id = parse_path_id(&id, "id")?;

    info!(request_id = %request_id, invoice_id, "Deleting invoice");
    state.invoice_service.delete_invoice(invoice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
