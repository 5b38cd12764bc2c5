use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{AppError, Page, Result};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use super::models::{
    default_invoice_number, CustomerDisplay, DiscountType, Invoice, InvoiceChanges,
    InvoiceWithParties, NewInvoice,
};
use super::store::{InvoiceStore, PartyDirectory};

// ============================================================================
// ROW MAPPING
// ============================================================================

const INVOICE_COLUMNS: &str = r#"
    i.invoice_id, i.invoice_number, i.amount, i.payment_mode, i.invoice_date,
    i.discount, i.discount_type, i.tax_amount, i.total_amount, i.status,
    i.due_date, i.shop_id, i.customer_id, i.created_on, i.updated_on
"#;

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    invoice_id: i32,
    invoice_number: String,
    amount: Decimal,
    payment_mode: String,
    invoice_date: DateTime<Utc>,
    discount: Option<Decimal>,
    discount_type: Option<String>,
    tax_amount: Option<Decimal>,
    total_amount: Decimal,
    status: String,
    due_date: Option<NaiveDate>,
    shop_id: i32,
    customer_id: i32,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        let discount_type = row.discount_type.as_deref().and_then(|raw| {
            let parsed = DiscountType::parse(raw);
            if parsed.is_none() {
                warn!("Invoice {} has unknown discount_type '{}'", row.invoice_id, raw);
            }
            parsed
        });

        Invoice {
            invoice_id: row.invoice_id,
            invoice_number: row.invoice_number,
            amount: row.amount,
            payment_mode: row.payment_mode,
            invoice_date: row.invoice_date,
            discount: row.discount,
            discount_type,
            tax_amount: row.tax_amount,
            total_amount: row.total_amount,
            status: row.status,
            due_date: row.due_date,
            shop_id: row.shop_id,
            customer_id: row.customer_id,
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceWithPartiesRow {
    #[sqlx(flatten)]
    invoice: InvoiceRow,
    shop_name: String,
    customer_name: String,
    customer_mobile: String,
}

impl From<InvoiceWithPartiesRow> for InvoiceWithParties {
    fn from(row: InvoiceWithPartiesRow) -> Self {
        InvoiceWithParties {
            invoice: row.invoice.into(),
            shop_name: row.shop_name,
            customer_name: row.customer_name,
            customer_mobile: row.customer_mobile,
        }
    }
}

fn select_with_parties(filter: &str) -> String {
    format!(
        r#"
        SELECT {INVOICE_COLUMNS},
               s.shop_name,
               a.customer_name,
               a.customer_mobile_no AS customer_mobile
        FROM invoices i
        JOIN shops s ON s.shop_id = i.shop_id
        JOIN accounts a ON a.account_id = i.customer_id
        {filter}
        "#
    )
}

// ============================================================================
// POSTGRES STORE
// ============================================================================

/// Invoice store and party directory backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<Invoice> {
        let mut tx = self.pool.begin().await?;

        // Reserve the id first so the default invoice number can embed it.
        let (invoice_id,): (i64,) =
            sqlx::query_as("SELECT nextval(pg_get_serial_sequence('invoices', 'invoice_id'))")
                .fetch_one(&mut *tx)
                .await?;
        let invoice_id = i32::try_from(invoice_id)
            .map_err(|_| AppError::store(format!("invoice id {} out of range", invoice_id)))?;

        let invoice_number = invoice
            .invoice_number
            .clone()
            .unwrap_or_else(|| default_invoice_number(invoice_id));

        let query = r#"
            INSERT INTO invoices AS i (
                invoice_id, invoice_number, amount, payment_mode, invoice_date,
                discount, discount_type, tax_amount, total_amount, status,
                due_date, shop_id, customer_id, created_on, updated_on
            ) VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
            RETURNING
                i.invoice_id, i.invoice_number, i.amount, i.payment_mode, i.invoice_date,
                i.discount, i.discount_type, i.tax_amount, i.total_amount, i.status,
                i.due_date, i.shop_id, i.customer_id, i.created_on, i.updated_on
        "#;

        let row = sqlx::query_as::<_, InvoiceRow>(query)
            .bind(invoice_id)
            .bind(&invoice_number)
            .bind(invoice.amount)
            .bind(&invoice.payment_mode)
            .bind(invoice.discount)
            .bind(invoice.discount_type.map(|d| d.as_str()))
            .bind(invoice.tax_amount)
            .bind(invoice.total_amount)
            .bind(&invoice.status)
            .bind(invoice.due_date)
            .bind(invoice.shop_id)
            .bind(invoice.customer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Error inserting invoice {}: {}", invoice_number, e);
                AppError::Database(e)
            })?;

        tx.commit().await?;

        info!("Invoice {} inserted with number {}", row.invoice_id, row.invoice_number);
        Ok(row.into())
    }

    async fn find_by_id(&self, invoice_id: i32) -> Result<Option<InvoiceWithParties>> {
        let query = select_with_parties("WHERE i.invoice_id = $1");

        let row = sqlx::query_as::<_, InvoiceWithPartiesRow>(&query)
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_page(&self, page: Page) -> Result<Vec<InvoiceWithParties>> {
        let query = select_with_parties("ORDER BY i.invoice_id ASC LIMIT $1 OFFSET $2");

        let offset = page
            .offset()
            .ok_or_else(|| AppError::validation("Page is out of range"))?;

        debug!("Fetching invoices limit={} offset={}", page.limit, offset);
        let rows = sqlx::query_as::<_, InvoiceWithPartiesRow>(&query)
            .bind(page.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Invoice>> {
        let query = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.status = $1 ORDER BY i.invoice_id ASC"
        );

        let rows = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Invoice>> {
        let query = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.customer_id = $1 ORDER BY i.invoice_id ASC"
        );

        let rows = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, invoice_id: i32, changes: &InvoiceChanges) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                invoice_number = COALESCE($2, invoice_number),
                amount = COALESCE($3, amount),
                payment_mode = COALESCE($4, payment_mode),
                discount = COALESCE($5, discount),
                discount_type = COALESCE($6, discount_type),
                tax_amount = COALESCE($7, tax_amount),
                total_amount = COALESCE($8, total_amount),
                status = COALESCE($9, status),
                due_date = COALESCE($10, due_date),
                shop_id = COALESCE($11, shop_id),
                customer_id = COALESCE($12, customer_id),
                updated_on = NOW()
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .bind(&changes.invoice_number)
        .bind(changes.amount)
        .bind(&changes.payment_mode)
        .bind(changes.discount)
        .bind(changes.discount_type.map(|d| d.as_str()))
        .bind(changes.tax_amount)
        .bind(changes.total_amount)
        .bind(&changes.status)
        .bind(changes.due_date)
        .bind(changes.shop_id)
        .bind(changes.customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Error updating invoice {}: {}", invoice_id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn update_total(&self, invoice_id: i32, total_amount: Decimal) -> Result<Option<Invoice>> {
        let query = format!(
            r#"
            UPDATE invoices AS i SET total_amount = $2, updated_on = NOW()
            WHERE i.invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&query)
            .bind(invoice_id)
            .bind(total_amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, invoice_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PartyDirectory for PgInvoiceStore {
    async fn resolve_shop_display_name(&self, shop_id: i32) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as("SELECT shop_name FROM shops WHERE shop_id = $1")
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(name,)| name)
            .ok_or_else(|| AppError::not_found(format!("Shop {}", shop_id)))
    }

    async fn resolve_customer_display(&self, customer_id: i32) -> Result<CustomerDisplay> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT customer_name, customer_mobile_no FROM accounts WHERE account_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(name, mobile)| CustomerDisplay { name, mobile })
            .ok_or_else(|| AppError::not_found(format!("Customer {}", customer_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::invoices::models::DEFAULT_INVOICE_STATUS;

    // These tests need a PostgreSQL database with the migrations applied and
    // a shop 1 / account 1 present.

    async fn setup_test_store() -> PgInvoiceStore {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost:5432/shop_invoicing_test".to_string());

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");
        PgInvoiceStore::new(pool)
    }

    fn new_invoice() -> NewInvoice {
        NewInvoice {
            invoice_number: None,
            amount: Decimal::new(50000, 2),
            payment_mode: "Cash".to_string(),
            discount: None,
            discount_type: None,
            tax_amount: None,
            total_amount: Decimal::new(50000, 2),
            status: DEFAULT_INVOICE_STATUS.to_string(),
            due_date: None,
            shop_id: 1,
            customer_id: 1,
        }
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_insert_defaults_invoice_number() {
        let store = setup_test_store().await;

        let invoice = store.insert(&new_invoice()).await.unwrap();
        assert_eq!(invoice.invoice_number, format!("INV-{}", invoice.invoice_id));

        assert_eq!(store.delete(invoice.invoice_id).await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_update_total_round_trip() {
        let store = setup_test_store().await;

        let invoice = store.insert(&new_invoice()).await.unwrap();
        let updated = store
            .update_total(invoice.invoice_id, Decimal::new(45000, 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.total_amount, Decimal::new(45000, 2));

        store.delete(invoice.invoice_id).await.unwrap();
    }
}
