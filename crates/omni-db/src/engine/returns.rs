//! # Returns
//!
//! Partial or full return of invoice lines. Stock is restored, each return
//! is audited as a positive movement linked to the invoice, and one
//! aggregate `return` ledger row carries the returned revenue and cost.
//!
//! The invoice itself stays `paid` and its snapshot lines are untouched;
//! return accounting lives entirely in the ledger and the movement trail.

use chrono::Utc;
use tracing::{debug, info};

use crate::engine::{product_event, Engine};
use crate::error::DbResult;
use crate::events::ChangeOp;
use crate::repository::{invoice, ledger, product, stock_movement};
use omni_core::{
    CoreError, FinancialRecord, MovementKind, StockMovement, TransactionKind,
};

/// Aggregate result of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnOutcome {
    /// Revenue returned to the customer (at snapshot prices).
    pub returned_amount: i64,
    /// Cost of the goods taken back (at snapshot costs).
    pub returned_cost: i64,
}

impl Engine {
    /// Returns selected quantities from an invoice.
    ///
    /// `selections` pairs a product id with the quantity to return; each
    /// quantity must not exceed what the invoice originally sold for that
    /// product. Values come from the invoice's snapshot lines, so a later
    /// price change never alters the refund.
    pub async fn return_items(
        &self,
        invoice_id: i64,
        selections: &[(i64, i64)],
    ) -> DbResult<ReturnOutcome> {
        if selections.is_empty() {
            return Err(CoreError::InvalidQuantity {
                context: "return selection".to_string(),
                quantity: 0,
            }
            .into());
        }
        for idx in 0..selections.len() {
            let (pid, qty) = selections[idx];
            if qty <= 0 {
                return Err(CoreError::InvalidQuantity {
                    context: format!("return of product {pid}"),
                    quantity: qty,
                }
                .into());
            }
            if selections[..idx].iter().any(|&(other, _)| other == pid) {
                return Err(CoreError::InvalidQuantity {
                    context: format!("duplicate return selection for product {pid}"),
                    quantity: qty,
                }
                .into());
            }
        }

        debug!(invoice_id, selections = selections.len(), "Processing return");

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let inv = invoice::get_by_id_tx(&mut *tx, invoice_id)
            .await?
            .ok_or(CoreError::InvoiceNotFound(invoice_id))?;
        let items = invoice::get_items_tx(&mut *tx, invoice_id).await?;

        let mut events = Vec::new();
        let mut returned_amount = 0i64;
        let mut returned_cost = 0i64;

        for &(product_id, quantity) in selections {
            let sold: i64 = items
                .iter()
                .filter(|i| i.product_id == product_id)
                .map(|i| i.quantity)
                .sum();

            if sold == 0 || quantity > sold {
                return Err(CoreError::InvalidQuantity {
                    context: format!(
                        "return of product {product_id} (sold {sold} on invoice {invoice_id})"
                    ),
                    quantity,
                }
                .into());
            }

            // Value the return line by line, in sale order, at snapshot
            // price and cost.
            let mut remaining = quantity;
            for item in items.iter().filter(|i| i.product_id == product_id) {
                if remaining == 0 {
                    break;
                }
                let take = remaining.min(item.quantity);
                returned_amount += item.price * take;
                returned_cost += item.cost * take;
                remaining -= take;
            }

            // A deleted product cannot take stock back; accepting it would
            // break stock-ledger consistency.
            if !product::apply_stock_delta_tx(&mut *tx, product_id, quantity).await? {
                return Err(CoreError::ProductNotFound(product_id).into());
            }

            stock_movement::insert_tx(
                &mut *tx,
                &StockMovement {
                    id: 0,
                    product_id,
                    kind: MovementKind::Return,
                    quantity,
                    date: now,
                    invoice_id: Some(invoice_id),
                    description: None,
                },
            )
            .await?;

            if let Some(updated) = product::get_by_id_tx(&mut *tx, product_id).await? {
                events.push(product_event(ChangeOp::Update, &updated)?);
            }
        }

        ledger::insert_tx(
            &mut *tx,
            &FinancialRecord {
                id: 0,
                kind: TransactionKind::Return,
                date: now,
                amount: returned_amount,
                related_cost: returned_cost,
                description: format!("Return against {}", inv.barcode),
                note: None,
                invoice_id: Some(invoice_id),
                customer_id: inv.customer_id,
                supplier_id: None,
                product_id: None,
            },
        )
        .await?;

        tx.commit().await?;
        self.publish_all(events);

        info!(
            invoice_id,
            returned_amount, returned_cost, "Return committed"
        );

        Ok(ReturnOutcome {
            returned_amount,
            returned_cost,
        })
    }
}
