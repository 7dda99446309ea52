//! # Domain Types
//!
//! Core domain types used throughout OmniPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │ FinancialRecord │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  price / cost   │   │  total / status │   │  kind / amount  │       │
//! │  │  stock          │   │  InvoiceItem[]  │   │  related_cost   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Customer / Supplier   StockMovement   AppNotification   StoreSettings │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every table uses an auto-incrementing `i64` primary key that is never
//! reused within the life of the local store. Serde field naming is camelCase
//! because these types double as rows on the sync wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::loyalty::LoyaltyConfig;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Primary key. Zero until the row is inserted.
    #[serde(default)]
    pub id: i64,

    /// Display name shown at the register and on receipts.
    pub name: String,

    /// Selling price in whole currency units.
    pub price: i64,

    /// Purchase cost, used for profit and loss accounting.
    pub cost: i64,

    /// Current stock level. The engine never lets this go below zero.
    pub stock: i64,

    /// Category name (free-form, see [`Category`]).
    pub category: String,

    /// Scannable barcode (EAN-13, UPC-A, or store-generated).
    pub barcode: Option<String>,

    /// Optional long description.
    pub description: Option<String>,

    /// Optional image reference (data URL or object key).
    pub image: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Contacts (Customer / Supplier)
// =============================================================================

/// A customer with a running debt balance and loyalty points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// Amount the customer owes the store. Invariant: debt >= 0.
    pub debt: i64,

    /// Loyalty point balance. Invariant: points >= 0.
    pub points: i64,

    /// Customer card barcode.
    pub barcode: Option<String>,

    /// Next debt payment due date, if a payment plan is agreed.
    pub next_payment_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A supplier the store owes money to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,

    /// Amount the store owes this supplier. Invariant: debt >= 0.
    pub debt: i64,

    /// Next payment due date toward the supplier.
    pub next_payment_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Which side of the counter a debt belongs to.
///
/// Settlement of a customer debt produces a `debt_in` ledger row (money
/// coming in); settlement toward a supplier produces `debt_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Customer,
    Supplier,
}

impl ContactKind {
    /// Ledger transaction kind recorded when a debt of this kind is settled.
    pub fn settlement_kind(&self) -> TransactionKind {
        match self {
            ContactKind::Customer => TransactionKind::DebtIn,
            ContactKind::Supplier => TransactionKind::DebtOut,
        }
    }
}

impl std::fmt::Display for ContactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactKind::Customer => write!(f, "customer"),
            ContactKind::Supplier => write!(f, "supplier"),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Invoice
// =============================================================================

/// The status of an invoice.
///
/// `Paid` is the only status the engine ever produces: checkout commits a
/// paid invoice, and partial returns are accounted for in the ledger and
/// stock_movements rather than by a status transition. The remaining
/// variants exist for data compatibility and are not reachable through any
/// engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Cancelled,
    Returned,
}

/// How an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Sale on credit; the total is added to the customer's debt.
    Debt,
}

/// A committed sale.
///
/// Immutable after creation: line items snapshot the product name, price,
/// and cost at transaction time, so invoice history does not change when the
/// product record is later edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: i64,
    pub customer_id: Option<i64>,
    /// Customer name at time of sale (frozen).
    pub customer_name: Option<String>,
    pub date: DateTime<Utc>,
    /// Grand total after any loyalty discount.
    pub total: i64,
    /// Sum of line costs, for profit reporting.
    pub total_cost: i64,
    pub status: InvoiceStatus,
    pub payment_method: PaymentMethod,
    /// Loyalty discount applied at checkout.
    pub discount_amount: i64,
    pub points_earned: i64,
    pub points_redeemed: i64,
    /// Receipt barcode, unique per invoice.
    pub barcode: String,
}

/// A line item in an invoice.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    #[serde(default)]
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price: i64,
    /// Unit cost at time of sale (frozen).
    pub cost: i64,
}

impl InvoiceItem {
    /// Line revenue (price x quantity).
    #[inline]
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }

    /// Line cost (cost x quantity).
    #[inline]
    pub fn line_cost(&self) -> i64 {
        self.cost * self.quantity
    }
}

// =============================================================================
// Financial Ledger
// =============================================================================

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Expense,
    Loss,
    DebtIn,
    DebtOut,
    Return,
}

/// An append-only ledger entry.
///
/// The ledger is the canonical source for every financial aggregate:
/// expenses and losses have no invoice, so reports must never be derived by
/// re-scanning invoices alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[serde(default)]
    pub id: i64,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    /// Revenue impact. Zero for pure cost events such as losses.
    pub amount: i64,
    /// Cost impact, when the event carries one.
    pub related_cost: i64,
    pub description: String,
    pub note: Option<String>,
    pub invoice_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub product_id: Option<i64>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Why a product's stock changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Sale,
    Restock,
    Loss,
    Return,
    Edit,
    Initial,
}

/// An append-only audit-trail row recording a signed stock change.
///
/// Invariant: for every product, the sum of movement quantities equals its
/// current stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    #[serde(default)]
    pub id: i64,
    pub product_id: i64,
    pub kind: MovementKind,
    /// Signed delta: negative for sales and losses, positive for restocks
    /// and returns.
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub invoice_id: Option<i64>,
    pub description: Option<String>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Stock,
    DebtCustomer,
    DebtSupplier,
    System,
}

/// A user-facing alert materialized by the notification watcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AppNotification {
    #[serde(default)]
    pub id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
    /// Optional deep link into the UI (e.g. "/products").
    pub link: Option<String>,
    /// Entity the alert refers to; used for deduplication.
    pub reference_id: Option<i64>,
}

// =============================================================================
// Store Settings
// =============================================================================

/// The settings singleton. Exactly one row (id = 1) exists at all times
/// after store initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    #[serde(default = "default_settings_id")]
    pub id: i64,
    pub store_name: String,
    pub currency: String,
    pub theme_color: String,
    pub loyalty_enabled: bool,
    /// Spend required to earn one point on cash/card sales.
    pub spend_per_point: i64,
    /// Discount value of a single point when redeemed.
    pub point_value: i64,
    /// Minimum point balance before redemption is allowed.
    pub min_points_to_redeem: i64,
    /// When true and an endpoint is configured, every local write on a
    /// syncable table is propagated as a delta.
    pub live_sync_enabled: bool,
    pub cloud_api_url: Option<String>,
    pub cloud_api_token: Option<String>,
}

fn default_settings_id() -> i64 {
    SETTINGS_ROW_ID
}

/// Fixed primary key of the settings singleton row.
pub const SETTINGS_ROW_ID: i64 = 1;

impl StoreSettings {
    /// Loyalty parameters as a value object for the pure loyalty math.
    pub fn loyalty(&self) -> LoyaltyConfig {
        LoyaltyConfig {
            enabled: self.loyalty_enabled,
            spend_per_point: self.spend_per_point,
            point_value: self.point_value,
            min_points_to_redeem: self.min_points_to_redeem,
        }
    }

    /// True when both conditions for live delta sync hold.
    pub fn live_sync_active(&self) -> bool {
        self.live_sync_enabled && self.cloud_api_url.is_some()
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            id: SETTINGS_ROW_ID,
            store_name: "My Store".to_string(),
            currency: "USD".to_string(),
            theme_color: "indigo".to_string(),
            loyalty_enabled: true,
            spend_per_point: 100,
            point_value: 10,
            min_points_to_redeem: 50,
            live_sync_enabled: false,
            cloud_api_url: None,
            cloud_api_token: None,
        }
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One line of a cart: what the cashier scanned and how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// A checkout command as issued by the register.
///
/// Quantities are re-validated against live stock inside the atomic unit,
/// never trusted from the caller's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
    /// Ask to redeem the customer's loyalty points as a discount.
    pub redeem_points: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_kind_per_contact() {
        assert_eq!(
            ContactKind::Customer.settlement_kind(),
            TransactionKind::DebtIn
        );
        assert_eq!(
            ContactKind::Supplier.settlement_kind(),
            TransactionKind::DebtOut
        );
    }

    #[test]
    fn test_transaction_kind_wire_names() {
        let json = serde_json::to_string(&TransactionKind::DebtIn).unwrap();
        assert_eq!(json, "\"debt_in\"");
        let json = serde_json::to_string(&TransactionKind::Sale).unwrap();
        assert_eq!(json, "\"sale\"");
    }

    #[test]
    fn test_entity_serializes_camel_case() {
        let movement = StockMovement {
            id: 7,
            product_id: 3,
            kind: MovementKind::Sale,
            quantity: -2,
            date: Utc::now(),
            invoice_id: Some(9),
            description: None,
        };
        let value = serde_json::to_value(&movement).unwrap();
        assert!(value.get("productId").is_some());
        assert!(value.get("invoiceId").is_some());
        assert_eq!(value["kind"], "sale");
    }

    #[test]
    fn test_invoice_item_line_math() {
        let item = InvoiceItem {
            id: 0,
            invoice_id: 1,
            product_id: 2,
            product_name: "Oud".into(),
            quantity: 3,
            price: 100,
            cost: 60,
        };
        assert_eq!(item.line_total(), 300);
        assert_eq!(item.line_cost(), 180);
    }

    #[test]
    fn test_default_settings_singleton_id() {
        let settings = StoreSettings::default();
        assert_eq!(settings.id, SETTINGS_ROW_ID);
        assert!(!settings.live_sync_active());
    }
}
