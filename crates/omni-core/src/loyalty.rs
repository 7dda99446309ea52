//! # Loyalty Module
//!
//! Pure arithmetic for the loyalty-point program: earning points on paid
//! sales and redeeming a point balance as a checkout discount.
//!
//! All values are whole currency units and whole points (i64); there is no
//! floating point anywhere in the calculation.
//!
//! ## Usage
//! ```rust
//! use omni_core::loyalty::{LoyaltyConfig, redemption, points_earned};
//!
//! let cfg = LoyaltyConfig { enabled: true, spend_per_point: 100, point_value: 10, min_points_to_redeem: 50 };
//!
//! // 60 points against a 1000 subtotal: 600 off, all 60 points consumed.
//! let r = redemption(1000, 60, &cfg).unwrap();
//! assert_eq!(r.discount, 600);
//! assert_eq!(r.points_redeemed, 60);
//!
//! // Earning on the discounted total of 400: one point per 100 spent.
//! assert_eq!(points_earned(400, &cfg), 4);
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Configuration
// =============================================================================

/// Loyalty parameters, snapshotted from [`crate::types::StoreSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyConfig {
    pub enabled: bool,
    /// Spend required to earn one point.
    pub spend_per_point: i64,
    /// Discount value of one redeemed point.
    pub point_value: i64,
    /// Minimum balance before redemption is allowed.
    pub min_points_to_redeem: i64,
}

// =============================================================================
// Redemption
// =============================================================================

/// Outcome of redeeming a point balance against a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Discount applied to the subtotal. Capped at the subtotal, so the
    /// total never goes negative.
    pub discount: i64,
    /// Points consumed: ceil(discount / point_value).
    pub points_redeemed: i64,
}

/// Computes the discount for redeeming `points` against `subtotal`.
///
/// Returns `None` when redemption is not possible: loyalty disabled, the
/// balance below the configured minimum, or a degenerate configuration
/// (non-positive point value).
pub fn redemption(subtotal: i64, points: i64, cfg: &LoyaltyConfig) -> Option<Redemption> {
    if !cfg.enabled || cfg.point_value <= 0 {
        return None;
    }
    if points < cfg.min_points_to_redeem || points <= 0 {
        return None;
    }

    let discount = subtotal.min(points * cfg.point_value);
    if discount <= 0 {
        return None;
    }

    // Ceiling division: a partially-used point is still consumed.
    let points_redeemed = (discount + cfg.point_value - 1) / cfg.point_value;

    Some(Redemption {
        discount,
        points_redeemed,
    })
}

// =============================================================================
// Earning
// =============================================================================

/// Points earned on a paid total: floor(total / spend_per_point).
///
/// Zero when loyalty is disabled or the configuration is degenerate.
pub fn points_earned(total: i64, cfg: &LoyaltyConfig) -> i64 {
    if !cfg.enabled || cfg.spend_per_point <= 0 || total <= 0 {
        return 0;
    }
    total / cfg.spend_per_point
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LoyaltyConfig {
        LoyaltyConfig {
            enabled: true,
            spend_per_point: 100,
            point_value: 10,
            min_points_to_redeem: 50,
        }
    }

    #[test]
    fn test_redemption_sixty_points_on_thousand() {
        // points=60, subtotal=1000 => discount=min(1000, 600)=600,
        // redeemed=ceil(600/10)=60
        let r = redemption(1000, 60, &cfg()).unwrap();
        assert_eq!(r.discount, 600);
        assert_eq!(r.points_redeemed, 60);
    }

    #[test]
    fn test_redemption_capped_at_subtotal() {
        // 450 points are worth 4500 but the cart is only 95.
        let r = redemption(95, 450, &cfg()).unwrap();
        assert_eq!(r.discount, 95);
        // Partial point still consumed: ceil(95/10) = 10.
        assert_eq!(r.points_redeemed, 10);
    }

    #[test]
    fn test_redemption_below_minimum() {
        assert!(redemption(1000, 49, &cfg()).is_none());
    }

    #[test]
    fn test_redemption_disabled() {
        let mut c = cfg();
        c.enabled = false;
        assert!(redemption(1000, 500, &c).is_none());
    }

    #[test]
    fn test_redemption_zero_subtotal() {
        assert!(redemption(0, 500, &cfg()).is_none());
    }

    #[test]
    fn test_points_earned_floor() {
        assert_eq!(points_earned(399, &cfg()), 3);
        assert_eq!(points_earned(400, &cfg()), 4);
        assert_eq!(points_earned(99, &cfg()), 0);
    }

    #[test]
    fn test_points_earned_degenerate_config() {
        let mut c = cfg();
        c.spend_per_point = 0;
        assert_eq!(points_earned(400, &c), 0);

        let mut c = cfg();
        c.enabled = false;
        assert_eq!(points_earned(400, &c), 0);
    }
}
