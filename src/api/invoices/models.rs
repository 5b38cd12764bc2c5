use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::invoices::{Invoice, InvoiceWithParties};

// ============================================================================
// REQUEST MODELS
// ============================================================================

/// Body of `POST /invoices`. `PUT /invoices/:invoiceid` takes the same fields
/// plus an optional explicit total (see [`UpdateInvoiceRequest`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    #[validate(length(min = 1, max = 50, message = "Invoice number must be between 1 and 50 characters"))]
    pub invoice_number: Option<String>,

    #[validate(required(message = "Amount is required"))]
    pub amount: Option<Decimal>,

    #[validate(
        required(message = "Payment mode is required"),
        length(min = 1, max = 50, message = "Payment mode must be between 1 and 50 characters")
    )]
    pub payment_mode: Option<String>,

    #[serde(alias = "shop")]
    #[validate(
        required(message = "Shop is required"),
        range(min = 1, message = "Shop id must be a positive integer")
    )]
    pub shop_id: Option<i32>,

    #[serde(alias = "customer")]
    #[validate(
        required(message = "Customer is required"),
        range(min = 1, message = "Customer id must be a positive integer")
    )]
    pub customer_id: Option<i32>,

    pub discount: Option<Decimal>,

    /// `Direct` or `Percentage`. Anything else is treated as no discount.
    pub discount_type: Option<String>,

    pub tax_amount: Option<Decimal>,

    pub due_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 20, message = "Status must be between 1 and 20 characters"))]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[serde(flatten)]
    pub invoice: InvoiceRequest,

    /// Update does not recompute the total; callers may set it here.
    pub total_amount: Option<Decimal>,
}

/// Body of `PATCH /invoices`. The target id travels in the body, as a number
/// or a numeric string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchInvoiceRequest {
    pub id: Option<serde_json::Value>,

    #[validate(length(min = 1, max = 50, message = "Invoice number must be between 1 and 50 characters"))]
    pub invoice_number: Option<String>,

    pub amount: Option<Decimal>,

    #[validate(length(min = 1, max = 50, message = "Payment mode must be between 1 and 50 characters"))]
    pub payment_mode: Option<String>,

    #[serde(alias = "shop")]
    #[validate(range(min = 1, message = "Shop id must be a positive integer"))]
    pub shop_id: Option<i32>,

    #[serde(alias = "customer")]
    #[validate(range(min = 1, message = "Customer id must be a positive integer"))]
    pub customer_id: Option<i32>,

    pub discount: Option<Decimal>,

    pub discount_type: Option<String>,

    pub tax_amount: Option<Decimal>,

    pub total_amount: Option<Decimal>,

    pub due_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 20, message = "Status must be between 1 and 20 characters"))]
    pub status: Option<String>,
}

/// Query string of `GET /invoices`. Kept as raw strings so malformed values
/// come back as field violations instead of extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    pub limit: Option<String>,
    pub page_number: Option<String>,
    pub status: Option<String>,
}

// ============================================================================
// RESPONSE MODELS
// ============================================================================

/// `GET /invoices` returns plain invoices when filtering by status and
/// invoices with shop/customer names when paging.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InvoiceListing {
    Filtered(Vec<Invoice>),
    Page(Vec<InvoiceWithParties>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub service: String,
    pub store: String,
    pub database: String,
}
