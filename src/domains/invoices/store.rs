use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{Page, Result};

use super::models::{CustomerDisplay, Invoice, InvoiceChanges, InvoiceWithParties, NewInvoice};

/// Persistence primitives for invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts a new invoice. A missing invoice number becomes `INV-<id>`.
    async fn insert(&self, invoice: &NewInvoice) -> Result<Invoice>;

    async fn find_by_id(&self, invoice_id: i32) -> Result<Option<InvoiceWithParties>>;

    /// Page of invoices ordered by id.
    async fn find_page(&self, page: Page) -> Result<Vec<InvoiceWithParties>>;

    async fn find_by_status(&self, status: &str) -> Result<Vec<Invoice>>;

    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Invoice>>;

    /// Applies the given changes. Returns the number of rows touched.
    async fn update(&self, invoice_id: i32, changes: &InvoiceChanges) -> Result<u64>;

    /// Overwrites the stored total. `None` when the invoice is gone.
    async fn update_total(&self, invoice_id: i32, total_amount: Decimal) -> Result<Option<Invoice>>;

    /// Returns the number of rows removed.
    async fn delete(&self, invoice_id: i32) -> Result<u64>;
}

/// Display lookups for the shop and customer an invoice points at.
#[async_trait]
pub trait PartyDirectory: Send + Sync {
    async fn resolve_shop_display_name(&self, shop_id: i32) -> Result<String>;

    async fn resolve_customer_display(&self, customer_id: i32) -> Result<CustomerDisplay>;
}
