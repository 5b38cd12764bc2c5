use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{AppError, Page, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::models::{
    default_invoice_number, CustomerDisplay, Invoice, InvoiceChanges, InvoiceWithParties,
    NewInvoice,
};
use super::store::{InvoiceStore, PartyDirectory};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    invoices: BTreeMap<i32, Invoice>,
    shops: HashMap<i32, String>,
    customers: HashMap<i32, CustomerDisplay>,
}

impl MemoryState {
    fn check_references(&self, shop_id: i32, customer_id: i32) -> Result<()> {
        if !self.shops.contains_key(&shop_id) {
            return Err(AppError::store(format!(
                "foreign key violation: shop {} does not exist",
                shop_id
            )));
        }
        if !self.customers.contains_key(&customer_id) {
            return Err(AppError::store(format!(
                "foreign key violation: customer {} does not exist",
                customer_id
            )));
        }
        Ok(())
    }

    fn check_unique_number(&self, invoice_number: &str, except: Option<i32>) -> Result<()> {
        let taken = self
            .invoices
            .values()
            .any(|i| i.invoice_number == invoice_number && Some(i.invoice_id) != except);
        if taken {
            return Err(AppError::store(format!(
                "unique violation: invoice number {} already exists",
                invoice_number
            )));
        }
        Ok(())
    }

    fn with_parties(&self, invoice: &Invoice) -> InvoiceWithParties {
        let customer = self.customers.get(&invoice.customer_id).cloned().unwrap_or(CustomerDisplay {
            name: String::new(),
            mobile: String::new(),
        });
        InvoiceWithParties {
            invoice: invoice.clone(),
            shop_name: self.shops.get(&invoice.shop_id).cloned().unwrap_or_default(),
            customer_name: customer.name,
            customer_mobile: customer.mobile,
        }
    }
}

/// In-process invoice store with the same constraints as the relational schema
/// (shop/customer references, unique invoice numbers).
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemoryInvoiceStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shop(&self, shop_id: i32, shop_name: impl Into<String>) {
        self.state.write().shops.insert(shop_id, shop_name.into());
    }

    pub fn add_customer(&self, customer_id: i32, name: impl Into<String>, mobile: impl Into<String>) {
        self.state.write().customers.insert(
            customer_id,
            CustomerDisplay {
                name: name.into(),
                mobile: mobile.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.state.read().invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<Invoice> {
        let mut state = self.state.write();
        state.check_references(invoice.shop_id, invoice.customer_id)?;

        let invoice_id = state.last_id + 1;
        let invoice_number = invoice
            .invoice_number
            .clone()
            .unwrap_or_else(|| default_invoice_number(invoice_id));
        state.check_unique_number(&invoice_number, None)?;

        let now = Utc::now();
        let stored = Invoice {
            invoice_id,
            invoice_number,
            amount: invoice.amount,
            payment_mode: invoice.payment_mode.clone(),
            invoice_date: now,
            discount: invoice.discount,
            discount_type: invoice.discount_type,
            tax_amount: invoice.tax_amount,
            total_amount: invoice.total_amount,
            status: invoice.status.clone(),
            due_date: invoice.due_date,
            shop_id: invoice.shop_id,
            customer_id: invoice.customer_id,
            created_on: now,
            updated_on: now,
        };

        state.last_id = invoice_id;
        state.invoices.insert(invoice_id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, invoice_id: i32) -> Result<Option<InvoiceWithParties>> {
        let state = self.state.read();
        Ok(state.invoices.get(&invoice_id).map(|i| state.with_parties(i)))
    }

    async fn find_page(&self, page: Page) -> Result<Vec<InvoiceWithParties>> {
        let (skip, take) = page
            .offset()
            .and_then(|offset| Some((usize::try_from(offset).ok()?, usize::try_from(page.limit).ok()?)))
            .ok_or_else(|| AppError::validation("Page is out of range"))?;

        let state = self.state.read();

        Ok(state
            .invoices
            .values()
            .skip(skip)
            .take(take)
            .map(|i| state.with_parties(i))
            .collect())
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Invoice>> {
        let state = self.state.read();
        Ok(state
            .invoices
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Invoice>> {
        let state = self.state.read();
        Ok(state
            .invoices
            .values()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn update(&self, invoice_id: i32, changes: &InvoiceChanges) -> Result<u64> {
        let mut state = self.state.write();
        let current = match state.invoices.get(&invoice_id) {
            Some(invoice) => invoice.clone(),
            None => return Ok(0),
        };

        let shop_id = changes.shop_id.unwrap_or(current.shop_id);
        let customer_id = changes.customer_id.unwrap_or(current.customer_id);
        state.check_references(shop_id, customer_id)?;
        if let Some(ref number) = changes.invoice_number {
            state.check_unique_number(number, Some(invoice_id))?;
        }

        let updated = Invoice {
            invoice_number: changes.invoice_number.clone().unwrap_or(current.invoice_number),
            amount: changes.amount.unwrap_or(current.amount),
            payment_mode: changes.payment_mode.clone().unwrap_or(current.payment_mode),
            discount: changes.discount.or(current.discount),
            discount_type: changes.discount_type.or(current.discount_type),
            tax_amount: changes.tax_amount.or(current.tax_amount),
            total_amount: changes.total_amount.unwrap_or(current.total_amount),
            status: changes.status.clone().unwrap_or(current.status),
            due_date: changes.due_date.or(current.due_date),
            shop_id,
            customer_id,
            updated_on: Utc::now(),
            ..current
        };
        state.invoices.insert(invoice_id, updated);
        Ok(1)
    }

    async fn update_total(&self, invoice_id: i32, total_amount: Decimal) -> Result<Option<Invoice>> {
        let mut state = self.state.write();
        Ok(state.invoices.get_mut(&invoice_id).map(|invoice| {
            invoice.total_amount = total_amount;
            invoice.updated_on = Utc::now();
            invoice.clone()
        }))
    }

    async fn delete(&self, invoice_id: i32) -> Result<u64> {
        let removed = self.state.write().invoices.remove(&invoice_id);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl PartyDirectory for MemoryInvoiceStore {
    async fn resolve_shop_display_name(&self, shop_id: i32) -> Result<String> {
        self.state
            .read()
            .shops
            .get(&shop_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Shop {}", shop_id)))
    }

    async fn resolve_customer_display(&self, customer_id: i32) -> Result<CustomerDisplay> {
        self.state
            .read()
            .customers
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Customer {}", customer_id)))
    }
}
