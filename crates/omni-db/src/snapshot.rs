//! # Store Snapshot
//!
//! Full-state export and import of the syncable tables (products,
//! customers, suppliers, categories, settings). The sync client pushes an
//! exported snapshot outward and applies a pulled one inward; it owns no
//! state of its own.
//!
//! Import is a clear-and-bulk-replace inside ONE transaction across all
//! tables, so a concurrent reader never observes a store with some tables
//! cleared and others not yet replaced. Remote primary keys are preserved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use omni_core::{Category, Customer, Product, StoreSettings, Supplier, SETTINGS_ROW_ID};

/// Every row of every syncable table.
///
/// Field names double as wire table names; date fields arriving as
/// ISO-8601 strings are parsed into native dates during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: Vec<StoreSettings>,
}

impl StoreSnapshot {
    /// Total row count across all tables.
    pub fn row_count(&self) -> usize {
        self.products.len()
            + self.customers.len()
            + self.suppliers.len()
            + self.categories.len()
            + self.settings.len()
    }
}

impl Database {
    /// Serializes every row of the syncable tables.
    pub async fn export_snapshot(&self) -> DbResult<StoreSnapshot> {
        let snapshot = StoreSnapshot {
            products: self.products().list().await?,
            customers: self.customers().list().await?,
            suppliers: self.suppliers().list().await?,
            categories: self.categories().list().await?,
            settings: vec![self.settings().get().await?],
        };

        debug!(rows = snapshot.row_count(), "Exported store snapshot");
        Ok(snapshot)
    }

    /// Replaces the syncable tables with the snapshot's rows, preserving
    /// the snapshot's primary keys, in one atomic unit.
    ///
    /// The settings table is only replaced when the snapshot carries a
    /// settings row, so the singleton invariant survives a remote that
    /// omits it. No change events are published: import is the sync
    /// client's own write path, and echoing it back out as deltas would
    /// loop.
    pub async fn import_snapshot(&self, snapshot: &StoreSnapshot) -> DbResult<()> {
        info!(rows = snapshot.row_count(), "Importing store snapshot");

        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        for p in &snapshot.products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, price, cost, stock, category, barcode, description, image, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(p.id)
            .bind(&p.name)
            .bind(p.price)
            .bind(p.cost)
            .bind(p.stock)
            .bind(&p.category)
            .bind(&p.barcode)
            .bind(&p.description)
            .bind(&p.image)
            .bind(p.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM customers").execute(&mut *tx).await?;
        for c in &snapshot.customers {
            sqlx::query(
                r#"
                INSERT INTO customers (id, name, phone, address, debt, points, barcode, next_payment_date, notes, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(c.id)
            .bind(&c.name)
            .bind(&c.phone)
            .bind(&c.address)
            .bind(c.debt)
            .bind(c.points)
            .bind(&c.barcode)
            .bind(c.next_payment_date)
            .bind(&c.notes)
            .bind(c.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM suppliers").execute(&mut *tx).await?;
        for s in &snapshot.suppliers {
            sqlx::query(
                r#"
                INSERT INTO suppliers (id, name, phone, address, note, debt, next_payment_date, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(s.id)
            .bind(&s.name)
            .bind(&s.phone)
            .bind(&s.address)
            .bind(&s.note)
            .bind(s.debt)
            .bind(s.next_payment_date)
            .bind(s.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
        for c in &snapshot.categories {
            sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
                .bind(c.id)
                .bind(&c.name)
                .execute(&mut *tx)
                .await?;
        }

        // Settings stays a singleton: the first remote row lands on the
        // fixed id, whatever key the remote assigned it.
        if let Some(s) = snapshot.settings.first() {
            sqlx::query("DELETE FROM settings").execute(&mut *tx).await?;
            sqlx::query(
                r#"
                INSERT INTO settings (
                    id, store_name, currency, theme_color, loyalty_enabled,
                    spend_per_point, point_value, min_points_to_redeem,
                    live_sync_enabled, cloud_api_url, cloud_api_token
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(SETTINGS_ROW_ID)
            .bind(&s.store_name)
            .bind(&s.currency)
            .bind(&s.theme_color)
            .bind(s.loyalty_enabled)
            .bind(s.spend_per_point)
            .bind(s.point_value)
            .bind(s.min_points_to_redeem)
            .bind(s.live_sync_enabled)
            .bind(&s.cloud_api_url)
            .bind(&s.cloud_api_token)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Snapshot import committed");
        Ok(())
    }

    /// True when no syncable user data exists yet (first session probe for
    /// the initial-sync bootstrap).
    pub async fn is_store_empty(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM products) + (SELECT COUNT(*) FROM customers) \
             + (SELECT COUNT(*) FROM suppliers) + (SELECT COUNT(*) FROM categories)",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(count == 0)
    }
}
