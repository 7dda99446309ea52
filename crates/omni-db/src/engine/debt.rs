//! # Debt Settlement
//!
//! Settles part or all of a contact's debt. The current debt is re-read
//! inside the atomic unit to guard against a concurrent settlement; an
//! amount exceeding the fresh balance fails with `StaleState` rather than
//! clamping silently.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::engine::{customer_event, supplier_event, Engine};
use crate::error::DbResult;
use crate::events::ChangeOp;
use crate::repository::{contact, ledger};
use omni_core::{ContactKind, CoreError, FinancialRecord};

impl Engine {
    /// Settles `amount` of the contact's debt.
    ///
    /// While a remainder exists, `next_due` (when given) replaces the next
    /// payment date; once the debt reaches zero the date is cleared.
    /// Appends a `debt_in` (customer) or `debt_out` (supplier) ledger row.
    ///
    /// Returns the remaining debt.
    pub async fn settle_debt(
        &self,
        contact_id: i64,
        kind: ContactKind,
        amount: i64,
        next_due: Option<DateTime<Utc>>,
    ) -> DbResult<i64> {
        if amount <= 0 {
            return Err(CoreError::InvalidAmount(amount).into());
        }

        debug!(contact_id, %kind, amount, "Settling debt");

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let (remainder, contact_name, event, customer_id, supplier_id) = match kind {
            ContactKind::Customer => {
                let c = contact::get_customer_tx(&mut *tx, contact_id)
                    .await?
                    .ok_or(CoreError::ContactNotFound { kind, id: contact_id })?;

                if amount > c.debt {
                    return Err(CoreError::StaleState(format!(
                        "settlement amount {} exceeds current debt {}",
                        amount, c.debt
                    ))
                    .into());
                }

                let remainder = c.debt - amount;
                let next_payment_date = if remainder > 0 {
                    next_due.or(c.next_payment_date)
                } else {
                    None
                };

                contact::set_customer_balances_tx(
                    &mut *tx,
                    c.id,
                    remainder,
                    c.points,
                    next_payment_date,
                )
                .await?;

                let mut updated = c;
                updated.debt = remainder;
                updated.next_payment_date = next_payment_date;
                let name = updated.name.clone();
                let event = customer_event(ChangeOp::Update, &updated)?;
                (remainder, name, event, Some(contact_id), None)
            }

            ContactKind::Supplier => {
                let s = contact::get_supplier_tx(&mut *tx, contact_id)
                    .await?
                    .ok_or(CoreError::ContactNotFound { kind, id: contact_id })?;

                if amount > s.debt {
                    return Err(CoreError::StaleState(format!(
                        "settlement amount {} exceeds current debt {}",
                        amount, s.debt
                    ))
                    .into());
                }

                let remainder = s.debt - amount;
                let next_payment_date = if remainder > 0 {
                    next_due.or(s.next_payment_date)
                } else {
                    None
                };

                contact::set_supplier_balance_tx(&mut *tx, s.id, remainder, next_payment_date)
                    .await?;

                let mut updated = s;
                updated.debt = remainder;
                updated.next_payment_date = next_payment_date;
                let name = updated.name.clone();
                let event = supplier_event(ChangeOp::Update, &updated)?;
                (remainder, name, event, None, Some(contact_id))
            }
        };

        let description = match kind {
            ContactKind::Customer => format!("Debt payment from {contact_name}"),
            ContactKind::Supplier => format!("Payment to supplier {contact_name}"),
        };

        ledger::insert_tx(
            &mut *tx,
            &FinancialRecord {
                id: 0,
                kind: kind.settlement_kind(),
                date: now,
                amount,
                related_cost: 0,
                description,
                note: None,
                invoice_id: None,
                customer_id,
                supplier_id,
                product_id: None,
            },
        )
        .await?;

        tx.commit().await?;
        self.publish_all(vec![event]);

        info!(contact_id, %kind, amount, remainder, "Debt settled");

        Ok(remainder)
    }
}
