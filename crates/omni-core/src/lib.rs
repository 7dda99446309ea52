//! # omni-core: Pure Business Logic for OmniPOS
//!
//! This crate is the heart of OmniPOS. It contains domain types, loyalty
//! arithmetic, and input validation as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OmniPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ omni-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │  loyalty  │  │ validation│                  │   │
//! │  │   │  Product  │  │  earn /   │  │   rules   │                  │   │
//! │  │   │  Invoice  │  │  redeem   │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              omni-db (store + transaction engine)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              omni-sync (cloud push / pull / delta)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, FinancialRecord, ...)
//! - [`loyalty`] - Point earning and redemption arithmetic (integer only)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod loyalty;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use loyalty::LoyaltyConfig;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product is considered low on stock and
/// the notification watcher raises an alert.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum quantity of a single line in a checkout. Guards against a typo
/// at the register (1000 instead of 10) turning into a committed sale.
pub const MAX_LINE_QUANTITY: i64 = 999;
