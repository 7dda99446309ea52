//! # Change Feed
//!
//! Notify-on-commit mechanism for the entity store. Every committed write
//! on a syncable table publishes a [`ChangeEvent`] on a broadcast bus;
//! reactive readers and the cloud sync hooks subscribe to it.
//!
//! Publishing is strictly post-commit and never blocks or fails the write
//! path: with no subscribers the event is dropped, and a slow subscriber
//! that lags only loses its own backlog.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// =============================================================================
// Syncable Tables
// =============================================================================

/// The tables mirrored to the cloud.
///
/// Invoices, financial_records, and stock_movements are intentionally not
/// part of this set; they never leave the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTable {
    Products,
    Customers,
    Suppliers,
    Categories,
    Settings,
}

impl SyncTable {
    /// All syncable tables, in push/pull order.
    pub const ALL: [SyncTable; 5] = [
        SyncTable::Products,
        SyncTable::Customers,
        SyncTable::Suppliers,
        SyncTable::Categories,
        SyncTable::Settings,
    ];

    /// Wire/table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTable::Products => "products",
            SyncTable::Customers => "customers",
            SyncTable::Suppliers => "suppliers",
            SyncTable::Categories => "categories",
            SyncTable::Settings => "settings",
        }
    }
}

impl std::fmt::Display for SyncTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Change Events
// =============================================================================

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Create,
    Update,
    Delete,
}

/// A committed row change on a syncable table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub op: ChangeOp,
    pub table: SyncTable,
    /// Primary key of the affected row.
    pub pk: i64,
    /// Full row state after the change; `None` for deletes.
    pub payload: Option<serde_json::Value>,
}

// =============================================================================
// Change Bus
// =============================================================================

/// Broadcast bus carrying [`ChangeEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Creates a bus with the given per-subscriber backlog capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        ChangeBus { tx }
    }

    /// Publishes an event. A send with no live subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        // Enough backlog that a briefly-busy sync hook does not lag out
        // during a burst of checkouts.
        ChangeBus::new(256)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(SyncTable::Products.as_str(), "products");
        assert_eq!(SyncTable::Settings.as_str(), "settings");
        assert_eq!(SyncTable::ALL.len(), 5);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = ChangeBus::default();
        bus.publish(ChangeEvent {
            op: ChangeOp::Create,
            table: SyncTable::Products,
            pk: 1,
            payload: None,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ChangeEvent {
            op: ChangeOp::Update,
            table: SyncTable::Customers,
            pk: 42,
            payload: Some(serde_json::json!({ "id": 42 })),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.op, ChangeOp::Update);
        assert_eq!(event.table, SyncTable::Customers);
        assert_eq!(event.pk, 42);
    }
}
