//! # Transaction Engine
//!
//! Every operation that touches more than one entity type runs here, inside
//! a single SQLite transaction: either all constituent writes commit or
//! none do, and stock, debt, and points are never left inconsistent with
//! the ledger.
//!
//! ## Atomic Unit Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Engine Operation                                 │
//! │                                                                         │
//! │  pool.begin() ──► fresh reads (stock, debt, points, settings)          │
//! │       │           invariant checks ──► typed CoreError on violation    │
//! │       │           writes: stock ► ledger ► contact balance             │
//! │       ▼                                                                 │
//! │  tx.commit() ──► publish collected ChangeEvents (post-commit only)     │
//! │                                                                         │
//! │  Any error before commit rolls the whole unit back; concurrent         │
//! │  readers never observe a half-applied state.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guard values are always re-read inside the unit. A checkout that lost a
//! race against another cart fails with `InsufficientStock` computed from
//! the live row, not the caller's stale snapshot.

mod checkout;
mod debt;
mod returns;
mod stock;

pub use checkout::CheckoutOutcome;
pub use returns::ReturnOutcome;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
use omni_core::{Customer, Product, Supplier};

/// Executes multi-table mutations as atomic units.
///
/// Cheap to clone and to create from [`crate::Database::engine`]; holds the
/// shared pool and the change bus.
#[derive(Debug, Clone)]
pub struct Engine {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl Engine {
    /// Creates a new engine over the given pool and change bus.
    pub(crate) fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        Engine { pool, bus }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Publishes the events collected during a committed unit.
    pub(crate) fn publish_all(&self, events: Vec<ChangeEvent>) {
        for event in events {
            self.bus.publish(event);
        }
    }
}

// =============================================================================
// Event constructors
// =============================================================================

pub(crate) fn product_event(op: ChangeOp, product: &Product) -> DbResult<ChangeEvent> {
    Ok(ChangeEvent {
        op,
        table: SyncTable::Products,
        pk: product.id,
        payload: Some(serde_json::to_value(product)?),
    })
}

pub(crate) fn customer_event(op: ChangeOp, customer: &Customer) -> DbResult<ChangeEvent> {
    Ok(ChangeEvent {
        op,
        table: SyncTable::Customers,
        pk: customer.id,
        payload: Some(serde_json::to_value(customer)?),
    })
}

pub(crate) fn supplier_event(op: ChangeOp, supplier: &Supplier) -> DbResult<ChangeEvent> {
    Ok(ChangeEvent {
        op,
        table: SyncTable::Suppliers,
        pk: supplier.id,
        payload: Some(serde_json::to_value(supplier)?),
    })
}

// =============================================================================
// Barcode generation
// =============================================================================

/// Generates a receipt barcode: INV-<yymmddHHMMSS>-<6 random hex chars>.
/// Unique per invoice for scan-based lookup.
pub(crate) fn generate_invoice_barcode() -> String {
    let stamp = Utc::now().format("%y%m%d%H%M%S");
    let nonce = Uuid::new_v4().simple().to_string();
    format!("INV-{}-{}", stamp, nonce[..6].to_uppercase())
}
