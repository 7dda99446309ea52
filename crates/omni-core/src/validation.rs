//! # Validation Module
//!
//! Input validation utilities for OmniPOS. These run before any business
//! logic or database access; the engine re-checks store-state invariants
//! (stock, debt) inside its atomic units regardless.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity display name (product, customer, supplier, category).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a cloud endpoint URL string.
///
/// Only the shape is checked here (scheme + non-empty host-ish remainder);
/// reachability is the health check's job.
pub fn validate_endpoint_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Required {
            field: "cloudApiUrl".to_string(),
        });
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "cloudApiUrl".to_string(),
            reason: "must start with http:// or https://".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a non-negative money field (price, cost, stock level).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Musk Oil").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_endpoint_url() {
        assert!(validate_endpoint_url("https://sync.example.com").is_ok());
        assert!(validate_endpoint_url("http://192.168.1.4:8787").is_ok());
        assert!(validate_endpoint_url("example.com").is_err());
        assert!(validate_endpoint_url("https://").is_err());
        assert!(validate_endpoint_url("").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("price", 0).is_ok());
        assert!(validate_non_negative("price", 100).is_ok());
        assert!(validate_non_negative("price", -1).is_err());
    }
}
