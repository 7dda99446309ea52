//! # Stock Operations
//!
//! Product creation with its initial movement, manual stock adjustment,
//! loss reporting, and plain expense entries. Loss is tracked by cost
//! impact, not revenue: the ledger row carries amount 0 and the cost in
//! `related_cost`.

use chrono::Utc;
use tracing::{debug, info};

use crate::engine::{product_event, Engine};
use crate::error::DbResult;
use crate::events::ChangeOp;
use crate::repository::{ledger, product, stock_movement};
use omni_core::validation::{validate_name, validate_non_negative};
use omni_core::{
    CoreError, FinancialRecord, MovementKind, Product, StockMovement, TransactionKind,
};

impl Engine {
    /// Creates a product; a non-zero opening stock is recorded as an
    /// `initial` movement in the same unit so the audit trail starts
    /// consistent.
    pub async fn create_product(&self, product: &Product) -> DbResult<Product> {
        validate_name("name", &product.name).map_err(CoreError::from)?;
        validate_non_negative("price", product.price).map_err(CoreError::from)?;
        validate_non_negative("cost", product.cost).map_err(CoreError::from)?;
        validate_non_negative("stock", product.stock).map_err(CoreError::from)?;

        debug!(name = %product.name, stock = product.stock, "Creating product");

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let mut created = product.clone();
        created.id = product::insert_tx(&mut *tx, product).await?;

        if created.stock > 0 {
            stock_movement::insert_tx(
                &mut *tx,
                &StockMovement {
                    id: 0,
                    product_id: created.id,
                    kind: MovementKind::Initial,
                    quantity: created.stock,
                    date: now,
                    invoice_id: None,
                    description: None,
                },
            )
            .await?;
        }

        tx.commit().await?;
        self.publish_all(vec![product_event(ChangeOp::Create, &created)?]);

        Ok(created)
    }

    /// Sets an absolute stock level, recording the delta as a `restock`
    /// (increase) or `edit` (decrease) movement. A no-op delta records
    /// nothing.
    pub async fn adjust_stock(&self, product_id: i64, new_stock: i64) -> DbResult<()> {
        if new_stock < 0 {
            return Err(CoreError::InvalidQuantity {
                context: format!("product {product_id} stock"),
                quantity: new_stock,
            }
            .into());
        }

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let p = product::get_by_id_tx(&mut *tx, product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(product_id))?;

        let delta = new_stock - p.stock;
        if delta == 0 {
            return Ok(());
        }

        product::set_stock_tx(&mut *tx, product_id, new_stock).await?;

        stock_movement::insert_tx(
            &mut *tx,
            &StockMovement {
                id: 0,
                product_id,
                kind: if delta > 0 {
                    MovementKind::Restock
                } else {
                    MovementKind::Edit
                },
                quantity: delta,
                date: now,
                invoice_id: None,
                description: None,
            },
        )
        .await?;

        tx.commit().await?;

        let mut updated = p;
        updated.stock = new_stock;
        self.publish_all(vec![product_event(ChangeOp::Update, &updated)?]);

        info!(product_id, new_stock, delta, "Stock adjusted");

        Ok(())
    }

    /// Reports damaged or lost units: decrements stock, appends a `loss`
    /// movement, and a ledger row carrying the cost impact.
    pub async fn report_loss(
        &self,
        product_id: i64,
        quantity: i64,
        note: Option<&str>,
    ) -> DbResult<()> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity {
                context: format!("product {product_id} loss"),
                quantity,
            }
            .into());
        }

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let p = product::get_by_id_tx(&mut *tx, product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(product_id))?;

        if p.stock < quantity {
            return Err(CoreError::InsufficientStock {
                name: p.name,
                available: p.stock,
                requested: quantity,
            }
            .into());
        }

        if !product::apply_stock_delta_tx(&mut *tx, product_id, -quantity).await? {
            return Err(CoreError::InsufficientStock {
                name: p.name,
                available: p.stock,
                requested: quantity,
            }
            .into());
        }

        stock_movement::insert_tx(
            &mut *tx,
            &StockMovement {
                id: 0,
                product_id,
                kind: MovementKind::Loss,
                quantity: -quantity,
                date: now,
                invoice_id: None,
                description: note.map(str::to_string),
            },
        )
        .await?;

        ledger::insert_tx(
            &mut *tx,
            &FinancialRecord {
                id: 0,
                kind: TransactionKind::Loss,
                date: now,
                amount: 0,
                related_cost: p.cost * quantity,
                description: format!("Loss: {} (x{})", p.name, quantity),
                note: note.map(str::to_string),
                invoice_id: None,
                customer_id: None,
                supplier_id: None,
                product_id: Some(product_id),
            },
        )
        .await?;

        tx.commit().await?;

        let mut updated = p;
        updated.stock -= quantity;
        self.publish_all(vec![product_event(ChangeOp::Update, &updated)?]);

        info!(product_id, quantity, "Loss reported");

        Ok(())
    }

    /// Appends a plain expense to the ledger (rent, electricity, ...).
    pub async fn record_expense(
        &self,
        amount: i64,
        description: &str,
        note: Option<&str>,
    ) -> DbResult<FinancialRecord> {
        if amount <= 0 {
            return Err(CoreError::InvalidAmount(amount).into());
        }
        validate_name("description", description).map_err(CoreError::from)?;

        let mut record = FinancialRecord {
            id: 0,
            kind: TransactionKind::Expense,
            date: Utc::now(),
            amount,
            related_cost: 0,
            description: description.trim().to_string(),
            note: note.map(str::to_string),
            invoice_id: None,
            customer_id: None,
            supplier_id: None,
            product_id: None,
        };
        record.id = ledger::insert_tx(self.pool(), &record).await?;

        info!(amount, "Expense recorded");

        Ok(record)
    }
}
