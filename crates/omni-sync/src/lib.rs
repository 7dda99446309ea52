//! # omni-sync: Cloud Sync Protocol Client for OmniPOS
//!
//! Reconciles the local entity store with a remote authoritative copy
//! without ever corrupting local state on network failure.
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Protocol                                  │
//! │                                                                         │
//! │  LOCAL STORE (omni-db)                       REMOTE ENDPOINT            │
//! │                                                                         │
//! │  export_snapshot ──── POST /sync/push ─────► full replace               │
//! │  import_snapshot ◄─── GET  /sync/pull ────── full snapshot              │
//! │                                                                         │
//! │  ChangeBus ──► SyncHooks ── POST /sync/delta ─► single row change       │
//! │  (post-commit)   (fire-and-forget, logged on failure)                   │
//! │                                                                         │
//! │  settings UI ──── GET /test/health ────► endpoint validation            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Local commits and remote propagation are decoupled by design: a local
//! write error aborts the atomic unit, a remote sync error never rolls back
//! an already-committed local write. That trades strict cross-device
//! consistency for local availability.
//!
//! ## Modules
//!
//! - [`client`] - HTTP client (push/pull/delta/health)
//! - [`full`] - Full-state push/pull and the first-run bootstrap
//! - [`hooks`] - Live delta forwarding with idempotent attach/detach
//! - [`error`] - Sync error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod full;
pub mod hooks;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{CloudClient, CloudConfig};
pub use error::{SyncError, SyncResult};
pub use full::{bootstrap_if_first_run, pull_full, push_full};
pub use hooks::SyncHooks;
