use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// DISCOUNT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountType {
    Direct,
    Percentage,
}

impl DiscountType {
    /// Exact match on the wire value. Anything else means "no discount".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Direct" => Some(DiscountType::Direct),
            "Percentage" => Some(DiscountType::Percentage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Direct => "Direct",
            DiscountType::Percentage => "Percentage",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const DEFAULT_INVOICE_STATUS: &str = "Pending";

/// Invoice number used when the caller does not supply one.
pub fn default_invoice_number(invoice_id: i32) -> String {
    format!("INV-{}", invoice_id)
}

// ============================================================================
// PERSISTED INVOICE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: i32,
    pub invoice_number: String,
    pub amount: Decimal,
    pub payment_mode: String,
    pub invoice_date: DateTime<Utc>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Decimal,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub shop_id: i32,
    pub customer_id: i32,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Invoice with the shop and customer display fields joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithParties {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub shop_name: String,
    pub customer_name: String,
    pub customer_mobile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDisplay {
    pub name: String,
    pub mobile: String,
}

// ============================================================================
// WRITE MODELS
// ============================================================================

/// Validated creation input.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    pub payment_mode: String,
    pub shop_id: i32,
    pub customer_id: i32,
    pub discount: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub tax_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Row handed to the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    pub payment_mode: String,
    pub discount: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Decimal,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub shop_id: i32,
    pub customer_id: i32,
}

/// Field-level assignments for update and patch. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceChanges {
    pub invoice_number: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_mode: Option<String>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub shop_id: Option<i32>,
    pub customer_id: Option<i32>,
}

impl InvoiceChanges {
    pub fn is_empty(&self) -> bool {
        *self == InvoiceChanges::default()
    }
}

// ============================================================================
// CREATION RESPONSE
// ============================================================================

pub const CREATION_SUCCESS_MARKER: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvoice {
    pub invoice_id: i32,
    pub invoice_number: String,
    pub amount: Decimal,
    pub payment_mode: String,
    pub invoice_date: DateTime<Utc>,
    pub shop_id: i32,
    pub shop_name: String,
    pub customer_id: i32,
    pub customer_name: String,
    pub customer_mobile: String,
    pub due_date: Option<NaiveDate>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub discount_amount: Decimal,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Decimal,
    /// Lifecycle status of the invoice itself.
    pub invoice_status: String,
    /// Outcome of the creation call, always `"success"`.
    pub status: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl CreatedInvoice {
    pub fn assemble(
        invoice: Invoice,
        discount_amount: Decimal,
        shop_name: String,
        customer: CustomerDisplay,
    ) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            invoice_number: invoice.invoice_number,
            amount: invoice.amount,
            payment_mode: invoice.payment_mode,
            invoice_date: invoice.invoice_date,
            shop_id: invoice.shop_id,
            shop_name,
            customer_id: invoice.customer_id,
            customer_name: customer.name,
            customer_mobile: customer.mobile,
            due_date: invoice.due_date,
            discount: invoice.discount,
            discount_type: invoice.discount_type,
            discount_amount,
            tax_amount: invoice.tax_amount,
            total_amount: invoice.total_amount,
            invoice_status: invoice.status,
            status: CREATION_SUCCESS_MARKER.to_string(),
            created_on: invoice.created_on,
            updated_on: invoice.updated_on,
        }
    }
}
