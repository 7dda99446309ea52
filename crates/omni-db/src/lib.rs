//! # omni-db: Entity Store + Transaction Engine for OmniPOS
//!
//! This crate owns all durable state for OmniPOS: the SQLite entity store,
//! the transaction engine for multi-table atomic mutations, the change feed
//! that notifies readers after commit, and the notification watcher.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OmniPOS Data Flow                                │
//! │                                                                         │
//! │  UI command (checkout, settle debt, restock, return)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     omni-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐   ┌──────────────┐   ┌──────────────────────┐  │   │
//! │  │   │  Engine   │──►│ Repositories │──►│  SQLite (WAL mode)   │  │   │
//! │  │   │ (atomic   │   │ (per table)  │   │  embedded migrations │  │   │
//! │  │   │  units)   │   └──────────────┘   └──────────────────────┘  │   │
//! │  │   └─────┬─────┘                                                │   │
//! │  │         │ post-commit                                          │   │
//! │  │         ▼                                                      │   │
//! │  │   ChangeBus ──► reactive readers, omni-sync delta hooks        │   │
//! │  │                                                                 │   │
//! │  │   NotificationWatcher ──► periodic read pass ──► notifications │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, [`Database`] handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`events`] - Post-commit change feed
//! - [`repository`] - Per-table repositories
//! - [`engine`] - Atomic multi-table operations
//! - [`snapshot`] - Full-state export/import for sync
//! - [`watcher`] - Notification generator

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;
pub mod watcher;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{CheckoutOutcome, Engine, ReturnOutcome};
pub use error::{DbError, DbResult};
pub use events::{ChangeBus, ChangeEvent, ChangeOp, SyncTable};
pub use pool::{Database, DbConfig};
pub use snapshot::StoreSnapshot;
pub use watcher::{NotificationWatcher, WatcherConfig, WatcherHandle};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::contact::{CustomerRepository, SupplierRepository};
pub use repository::invoice::InvoiceRepository;
pub use repository::ledger::{LedgerRepository, LedgerSummary};
pub use repository::notification::NotificationRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
pub use repository::stock_movement::StockMovementRepository;
