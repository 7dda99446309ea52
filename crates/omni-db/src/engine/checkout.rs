//! # Checkout
//!
//! The sale operation: validates the cart against live stock, applies the
//! loyalty program, and commits stock decrements, movements, the invoice
//! with snapshot lines, the ledger entry, and contact balance changes as
//! one unit.

use chrono::Utc;
use tracing::{debug, info};

use crate::engine::{customer_event, generate_invoice_barcode, product_event, Engine};
use crate::error::DbResult;
use crate::events::ChangeOp;
use crate::repository::{contact, invoice, ledger, product, settings, stock_movement};
use omni_core::{
    loyalty, CheckoutRequest, ContactKind, CoreError, FinancialRecord, Invoice, InvoiceItem,
    InvoiceStatus, MovementKind, PaymentMethod, StockMovement, TransactionKind, MAX_LINE_QUANTITY,
};

/// What a committed checkout produced.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

impl Engine {
    /// Commits a sale.
    ///
    /// Quantities are re-validated against the latest stock inside the
    /// atomic unit; two concurrent carts cannot oversell. On any violation
    /// the whole operation fails with a typed error and no partial writes
    /// occur.
    pub async fn checkout(&self, request: &CheckoutRequest) -> DbResult<CheckoutOutcome> {
        if request.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        for line in &request.lines {
            if line.quantity <= 0 || line.quantity > MAX_LINE_QUANTITY {
                return Err(CoreError::InvalidQuantity {
                    context: format!("product {}", line.product_id),
                    quantity: line.quantity,
                }
                .into());
            }
        }

        debug!(
            lines = request.lines.len(),
            customer = ?request.customer_id,
            method = ?request.payment_method,
            "Starting checkout"
        );

        let mut tx = self.pool().begin().await?;

        let store = settings::get_tx(&mut *tx).await?;
        let loyalty_cfg = store.loyalty();
        let now = Utc::now();

        // Fresh customer read inside the unit.
        let customer = match request.customer_id {
            Some(id) => Some(
                contact::get_customer_tx(&mut *tx, id)
                    .await?
                    .ok_or(CoreError::ContactNotFound {
                        kind: ContactKind::Customer,
                        id,
                    })?,
            ),
            None => None,
        };

        // Fresh product reads; totals from live prices, not the caller's.
        let mut products = Vec::with_capacity(request.lines.len());
        let mut subtotal = 0i64;
        let mut total_cost = 0i64;
        for line in &request.lines {
            let p = product::get_by_id_tx(&mut *tx, line.product_id)
                .await?
                .ok_or(CoreError::ProductNotFound(line.product_id))?;

            if p.stock < line.quantity {
                return Err(CoreError::InsufficientStock {
                    name: p.name,
                    available: p.stock,
                    requested: line.quantity,
                }
                .into());
            }

            subtotal += p.price * line.quantity;
            total_cost += p.cost * line.quantity;
            products.push(p);
        }

        // Loyalty redemption against the fresh point balance. The discount
        // is capped at the subtotal so the total never goes negative.
        let redemption = if request.redeem_points {
            customer
                .as_ref()
                .and_then(|c| loyalty::redemption(subtotal, c.points, &loyalty_cfg))
        } else {
            None
        };

        let discount = redemption.map(|r| r.discount).unwrap_or(0);
        let points_redeemed = redemption.map(|r| r.points_redeemed).unwrap_or(0);
        let total = subtotal - discount;

        // Points are earned on cash/card sales only, and never on a sale
        // that itself redeemed points.
        let points_earned = if redemption.is_none()
            && customer.is_some()
            && request.payment_method != PaymentMethod::Debt
        {
            loyalty::points_earned(total, &loyalty_cfg)
        } else {
            0
        };

        let mut invoice = Invoice {
            id: 0,
            customer_id: customer.as_ref().map(|c| c.id),
            customer_name: customer.as_ref().map(|c| c.name.clone()),
            date: now,
            total,
            total_cost,
            status: InvoiceStatus::Paid,
            payment_method: request.payment_method,
            discount_amount: discount,
            points_earned,
            points_redeemed,
            barcode: generate_invoice_barcode(),
        };
        invoice.id = invoice::insert_tx(&mut *tx, &invoice).await?;

        let mut events = Vec::new();
        let mut items = Vec::with_capacity(request.lines.len());

        for (line, p) in request.lines.iter().zip(products.iter()) {
            // Guarded decrement. A false return means another line of this
            // cart already consumed the margin the earlier check saw.
            if !product::apply_stock_delta_tx(&mut *tx, p.id, -line.quantity).await? {
                let available = product::get_by_id_tx(&mut *tx, p.id)
                    .await?
                    .map(|fresh| fresh.stock)
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    name: p.name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            stock_movement::insert_tx(
                &mut *tx,
                &StockMovement {
                    id: 0,
                    product_id: p.id,
                    kind: MovementKind::Sale,
                    quantity: -line.quantity,
                    date: now,
                    invoice_id: Some(invoice.id),
                    description: None,
                },
            )
            .await?;

            let mut item = InvoiceItem {
                id: 0,
                invoice_id: invoice.id,
                product_id: p.id,
                product_name: p.name.clone(),
                quantity: line.quantity,
                price: p.price,
                cost: p.cost,
            };
            item.id = invoice::insert_item_tx(&mut *tx, &item).await?;
            items.push(item);

            let mut updated = p.clone();
            updated.stock -= line.quantity;
            events.push(product_event(ChangeOp::Update, &updated)?);
        }

        ledger::insert_tx(
            &mut *tx,
            &FinancialRecord {
                id: 0,
                kind: TransactionKind::Sale,
                date: now,
                amount: total,
                related_cost: total_cost,
                description: format!("Sale {}", invoice.barcode),
                note: None,
                invoice_id: Some(invoice.id),
                customer_id: invoice.customer_id,
                supplier_id: None,
                product_id: None,
            },
        )
        .await?;

        // Contact balance last; order inside the unit is not observable.
        if let Some(c) = customer {
            let debt = if request.payment_method == PaymentMethod::Debt {
                c.debt + total
            } else {
                c.debt
            };
            let points = c.points - points_redeemed + points_earned;

            if !contact::set_customer_balances_tx(&mut *tx, c.id, debt, points, c.next_payment_date)
                .await?
            {
                return Err(CoreError::ContactNotFound {
                    kind: ContactKind::Customer,
                    id: c.id,
                }
                .into());
            }

            let mut updated = c;
            updated.debt = debt;
            updated.points = points;
            events.push(customer_event(ChangeOp::Update, &updated)?);
        }

        tx.commit().await?;
        self.publish_all(events);

        info!(
            invoice_id = invoice.id,
            barcode = %invoice.barcode,
            total,
            items = items.len(),
            "Checkout committed"
        );

        Ok(CheckoutOutcome { invoice, items })
    }
}
