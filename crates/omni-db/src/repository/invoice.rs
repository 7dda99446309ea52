//! # Invoice Repository
//!
//! Read access to committed invoices and their snapshot line items.
//! Invoices are created exclusively by the transaction engine's checkout
//! and are immutable afterwards; there are deliberately no update methods
//! here.

use sqlx::SqlitePool;

use crate::error::DbResult;
use omni_core::{Invoice, InvoiceItem};

const INVOICE_COLUMNS: &str = "id, customer_id, customer_name, date, total, total_cost, status, \
     payment_method, discount_amount, points_earned, points_redeemed, barcode";

/// Repository for invoice reads.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets an invoice by its receipt barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE barcode = ?"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Most recent invoices first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY date DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// All invoices for one customer, newest first.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE customer_id = ? ORDER BY date DESC, id DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Snapshot line items of an invoice, in insertion order.
    pub async fn get_items(&self, invoice_id: i64) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT id, invoice_id, product_id, product_name, quantity, price, cost \
             FROM invoice_items WHERE invoice_id = ? ORDER BY id",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

pub(crate) async fn get_by_id_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
) -> DbResult<Option<Invoice>> {
    let invoice = sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(invoice)
}

pub(crate) async fn get_items_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    invoice_id: i64,
) -> DbResult<Vec<InvoiceItem>> {
    let items = sqlx::query_as::<_, InvoiceItem>(
        "SELECT id, invoice_id, product_id, product_name, quantity, price, cost \
         FROM invoice_items WHERE invoice_id = ? ORDER BY id",
    )
    .bind(invoice_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Inserts an invoice row and returns the assigned id.
pub(crate) async fn insert_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    invoice: &Invoice,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO invoices (
            customer_id, customer_name, date, total, total_cost, status,
            payment_method, discount_amount, points_earned, points_redeemed, barcode
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invoice.customer_id)
    .bind(&invoice.customer_name)
    .bind(invoice.date)
    .bind(invoice.total)
    .bind(invoice.total_cost)
    .bind(invoice.status)
    .bind(invoice.payment_method)
    .bind(invoice.discount_amount)
    .bind(invoice.points_earned)
    .bind(invoice.points_redeemed)
    .bind(&invoice.barcode)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts one snapshot line item.
pub(crate) async fn insert_item_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    item: &InvoiceItem,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO invoice_items (invoice_id, product_id, product_name, quantity, price, cost)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.invoice_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.price)
    .bind(item.cost)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}
