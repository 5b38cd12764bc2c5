use shared::{AppError, Page, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{
    CreatedInvoice, Invoice, InvoiceChanges, InvoiceDraft, InvoiceWithParties, NewInvoice,
    DEFAULT_INVOICE_STATUS,
};
use super::pricing::price_invoice;
use super::store::{InvoiceStore, PartyDirectory};

/// Invoice flow over an injected store and party directory.
#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    directory: Arc<dyn PartyDirectory>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>, directory: Arc<dyn PartyDirectory>) -> Self {
        Self { store, directory }
    }

    /// Creates an invoice and applies its discount.
    ///
    /// The base invoice (`amount + tax`) is persisted first, then the
    /// discount-adjusted total is written back. If the write-back fails the
    /// base invoice stays as it was saved.
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> Result<CreatedInvoice> {
        let priced = price_invoice(
            draft.amount,
            draft.tax_amount,
            draft.discount_type,
            draft.discount,
        )?;

        let new_invoice = NewInvoice {
            invoice_number: draft.invoice_number,
            amount: draft.amount,
            payment_mode: draft.payment_mode,
            discount: draft.discount,
            discount_type: draft.discount_type,
            tax_amount: draft.tax_amount,
            total_amount: priced.base_total,
            status: draft
                .status
                .unwrap_or_else(|| DEFAULT_INVOICE_STATUS.to_string()),
            due_date: draft.due_date,
            shop_id: draft.shop_id,
            customer_id: draft.customer_id,
        };

        let saved = self.store.insert(&new_invoice).await?;
        info!(
            "Invoice {} saved with base total {}",
            saved.invoice_id, saved.total_amount
        );

        let discount_amount = priced.discount_amount;
        let adjusted_total = saved.total_amount - discount_amount;
        let invoice = if discount_amount.is_zero() {
            saved
        } else {
            debug!(
                "Applying discount {} to invoice {}",
                discount_amount, saved.invoice_id
            );
            self.store
                .update_total(saved.invoice_id, adjusted_total)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Invoice {}", saved.invoice_id)))?
        };

        let (shop_name, customer) = tokio::try_join!(
            self.directory.resolve_shop_display_name(invoice.shop_id),
            self.directory.resolve_customer_display(invoice.customer_id),
        )?;

        info!(
            "Invoice {} created: discount {}, total {}",
            invoice.invoice_id, discount_amount, invoice.total_amount
        );

        Ok(CreatedInvoice::assemble(invoice, discount_amount, shop_name, customer))
    }

    pub async fn get_invoice(&self, invoice_id: i32) -> Result<InvoiceWithParties> {
        self.store
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice"))
    }

    pub async fn list_invoices(&self, page: Page) -> Result<Vec<InvoiceWithParties>> {
        self.store.find_page(page).await
    }

    /// Exact match on `status`. Blank filters are rejected.
    pub async fn filter_by_status(&self, status: &str) -> Result<Vec<Invoice>> {
        let status = status.trim();
        if status.is_empty() {
            return Err(AppError::validation("Invalid or missing status parameter"));
        }
        self.store.find_by_status(status).await
    }

    pub async fn list_by_customer(&self, customer_id: i32) -> Result<Vec<Invoice>> {
        self.store.find_by_customer(customer_id).await
    }

    pub async fn update_invoice(
        &self,
        invoice_id: i32,
        changes: InvoiceChanges,
    ) -> Result<InvoiceWithParties> {
        self.apply_changes(invoice_id, changes, "update").await
    }

    pub async fn patch_invoice(
        &self,
        invoice_id: i32,
        changes: InvoiceChanges,
    ) -> Result<InvoiceWithParties> {
        self.apply_changes(invoice_id, changes, "patch").await
    }

    async fn apply_changes(
        &self,
        invoice_id: i32,
        changes: InvoiceChanges,
        operation: &str,
    ) -> Result<InvoiceWithParties> {
        if self.store.find_by_id(invoice_id).await?.is_none() {
            warn!("Invoice {} not found for {}", invoice_id, operation);
            return Err(AppError::not_found("Invoice"));
        }

        if changes.is_empty() {
            debug!("Empty {} for invoice {}", operation, invoice_id);
        } else if self.store.update(invoice_id, &changes).await? == 0 {
            return Err(AppError::not_found("Invoice"));
        }

        info!("Invoice {} {}d", invoice_id, operation);
        self.get_invoice(invoice_id).await
    }

    /// Removes an invoice. Nothing deleted means not found.
    pub async fn delete_invoice(&self, invoice_id: i32) -> Result<()> {
        let deleted = self.store.delete(invoice_id).await?;
        if deleted == 0 {
            warn!("Invoice {} not found for delete", invoice_id);
            return Err(AppError::not_found("Invoice"));
        }
        info!("Invoice {} deleted", invoice_id);
        Ok(())
    }
}
