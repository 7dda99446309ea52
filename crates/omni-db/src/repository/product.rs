//! # Product Repository
//!
//! Database operations for products.
//!
//! Single-row writes publish a change event after the statement commits,
//! which is what live sync and reactive readers observe. Multi-table
//! mutations of stock (sales, losses, returns, adjustments) live in the
//! transaction engine, not here.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
use omni_core::validation::{validate_name, validate_non_negative};
use omni_core::Product;

const SELECT_COLUMNS: &str = "id, name, price, cost, stock, category, barcode, description, image, created_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        ProductRepository { pool, bus }
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by barcode (register scan path).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE barcode = ?"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Products at or below the given stock threshold, for the watcher.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE stock <= ? ORDER BY stock"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product (metadata edit; NOT a stock adjustment —
    /// use the engine's `adjust_stock` so a movement row is recorded).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_name("name", &product.name).map_err(omni_core::CoreError::from)?;
        validate_non_negative("price", product.price).map_err(omni_core::CoreError::from)?;
        validate_non_negative("cost", product.cost).map_err(omni_core::CoreError::from)?;

        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, price = ?, cost = ?, category = ?,
                barcode = ?, description = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost)
        .bind(&product.category)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        // Stock is intentionally not touched here; re-read the committed row
        // so the published payload carries the live stock value.
        let committed = self
            .get_by_id(product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product.id))?;

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Products,
            pk: product.id,
            payload: Some(serde_json::to_value(&committed)?),
        });

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Historical invoice lines keep their snapshots, so deletion is allowed
    /// even for referenced products; only live-stock operations on the
    /// deleted product will fail afterwards.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.bus.publish(ChangeEvent {
            op: ChangeOp::Delete,
            table: SyncTable::Products,
            pk: id,
            payload: None,
        });

        Ok(())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-level helpers (shared with the transaction engine)
// =============================================================================

/// Fetches a product inside a caller-owned transaction.
pub(crate) async fn get_by_id_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Inserts a product row and returns the assigned id.
pub(crate) async fn insert_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    product: &Product,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO products (name, price, cost, stock, category, barcode, description, image, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.cost)
    .bind(product.stock)
    .bind(&product.category)
    .bind(&product.barcode)
    .bind(&product.description)
    .bind(&product.image)
    .bind(product.created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Applies a guarded stock delta: the row is only updated when the
/// resulting stock stays non-negative. Returns `false` when the guard (or a
/// missing row) prevented the update, so the caller can re-read and raise
/// the precise domain error.
pub(crate) async fn apply_stock_delta_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
    delta: i64,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE products SET stock = stock + ? WHERE id = ? AND stock + ? >= 0")
        .bind(delta)
        .bind(id)
        .bind(delta)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Sets an absolute stock level inside a caller-owned transaction.
pub(crate) async fn set_stock_tx(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: i64,
    stock: i64,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
        .bind(stock)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}
