//! # Error Types
//!
//! Domain-specific error types for omni-core.
//!
//! Errors are enum variants, never strings, and each variant carries enough
//! context to render a user-facing message. Concurrency-sensitive variants
//! (`InsufficientStock`, `StaleState`) are only ever produced against a
//! fresh read inside an atomic unit.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found. The record vanished between the caller's
    /// read and the commit attempt; treated like a staleness error.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Customer or supplier cannot be found.
    #[error("{kind} not found: {id}")]
    ContactNotFound {
        kind: crate::types::ContactKind,
        id: i64,
    },

    /// Invoice cannot be found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(i64),

    /// Live stock is lower than the requested quantity.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The caller's snapshot no longer matches the store, e.g. a settlement
    /// amount exceeding the freshly-read debt.
    #[error("Stale state: {0}")]
    StaleState(String),

    /// A quantity is zero, negative, or exceeds what the operation allows.
    #[error("Invalid quantity for {context}: {quantity}")]
    InvalidQuantity { context: String, quantity: i64 },

    /// A monetary amount is zero or negative where a positive one is needed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Checkout was requested with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, caught before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. a malformed endpoint URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate category name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
