//! # Stock Movement Repository
//!
//! Append-only audit trail of stock changes. For every product, the sum of
//! movement quantities equals its current stock; `sum_for_product` exposes
//! that invariant for tests and diagnostics.

use sqlx::SqlitePool;

use crate::error::DbResult;
use omni_core::StockMovement;

const MOVEMENT_COLUMNS: &str = "id, product_id, kind, quantity, date, invoice_id, description";

/// Repository for stock movement reads.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    /// Creates a new StockMovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// All movements for a product, oldest first.
    pub async fn list_for_product(&self, product_id: i64) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE product_id = ? ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements linked to one invoice (sale lines and later returns).
    pub async fn list_for_invoice(&self, invoice_id: i64) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE invoice_id = ? ORDER BY id"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Signed sum of all movements for a product. Equals the product's
    /// current stock when the audit trail is intact.
    pub async fn sum_for_product(&self, product_id: i64) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_movements WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

/// Appends a movement row and returns the assigned id.
pub(crate) async fn insert_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    movement: &StockMovement,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO stock_movements (product_id, kind, quantity, date, invoice_id, description)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.kind)
    .bind(movement.quantity)
    .bind(movement.date)
    .bind(movement.invoice_id)
    .bind(&movement.description)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}
