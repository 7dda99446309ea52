//! Snapshot export/import tests: clear-and-replace semantics and primary
//! key preservation.

use chrono::Utc;

use omni_core::{Customer, Product};
use omni_db::{Database, DbConfig};

async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let engine = db.engine();

    db.categories().insert("Fragrance").await.unwrap();

    engine
        .create_product(&Product {
            id: 0,
            name: "Sauvage Elixir".to_string(),
            price: 24_000,
            cost: 18_000,
            stock: 12,
            category: "Fragrance".to_string(),
            barcode: Some("6251234567890".to_string()),
            description: None,
            image: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    db.customers()
        .insert(&Customer {
            id: 0,
            name: "Ahmed M.".to_string(),
            phone: Some("0550123456".to_string()),
            address: None,
            debt: 1500,
            points: 120,
            barcode: None,
            next_payment_date: None,
            notes: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let mut settings = db.settings().get().await.unwrap();
    settings.store_name = "Roundtrip Store".to_string();
    db.settings().update(&settings).await.unwrap();

    db
}

#[tokio::test]
async fn export_then_import_into_fresh_store_is_equivalent() {
    let source = seeded_db().await;
    let snapshot = source.export_snapshot().await.unwrap();
    assert_eq!(snapshot.row_count(), 4);

    let target = Database::new(DbConfig::in_memory()).await.unwrap();
    target.import_snapshot(&snapshot).await.unwrap();

    let round_tripped = target.export_snapshot().await.unwrap();

    assert_eq!(round_tripped.products, snapshot.products);
    assert_eq!(round_tripped.customers, snapshot.customers);
    assert_eq!(round_tripped.suppliers, snapshot.suppliers);
    assert_eq!(round_tripped.categories, snapshot.categories);
    assert_eq!(round_tripped.settings, snapshot.settings);

    // Primary keys survived the replace.
    assert_eq!(
        round_tripped.products[0].id,
        snapshot.products[0].id
    );
}

#[tokio::test]
async fn import_replaces_existing_rows() {
    let source = seeded_db().await;
    let snapshot = source.export_snapshot().await.unwrap();

    // The target already has rows that must disappear on import.
    let target = seeded_db().await;
    target
        .engine()
        .create_product(&Product {
            id: 0,
            name: "Stale local product".to_string(),
            price: 1,
            cost: 1,
            stock: 1,
            category: "General".to_string(),
            barcode: None,
            description: None,
            image: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    target.import_snapshot(&snapshot).await.unwrap();

    let products = target.products().list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Sauvage Elixir");
}

#[tokio::test]
async fn import_without_settings_keeps_local_singleton() {
    let source = seeded_db().await;
    let mut snapshot = source.export_snapshot().await.unwrap();
    snapshot.settings.clear();

    let target = Database::new(DbConfig::in_memory()).await.unwrap();
    target.import_snapshot(&snapshot).await.unwrap();

    // Singleton invariant holds even when the remote omits settings.
    let settings = target.settings().get().await.unwrap();
    assert_eq!(settings.id, omni_core::SETTINGS_ROW_ID);
}

#[tokio::test]
async fn empty_store_probe() {
    let fresh = Database::new(DbConfig::in_memory()).await.unwrap();
    assert!(fresh.is_store_empty().await.unwrap());

    let seeded = seeded_db().await;
    assert!(!seeded.is_store_empty().await.unwrap());
}

#[tokio::test]
async fn snapshot_parses_iso_dates_from_wire_json() {
    // The remote emits dates as ISO-8601 strings; deserialization must
    // produce native dates.
    let json = serde_json::json!({
        "products": [{
            "name": "Wire product",
            "price": 10,
            "cost": 5,
            "stock": 2,
            "category": "General",
            "id": 7,
            "createdAt": "2026-01-15T10:30:00Z"
        }],
        "customers": [],
        "suppliers": [],
        "categories": [],
        "settings": []
    });

    let snapshot: omni_db::StoreSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(snapshot.products.len(), 1);
    assert_eq!(snapshot.products[0].id, 7);
    assert_eq!(
        snapshot.products[0].created_at.to_rfc3339(),
        "2026-01-15T10:30:00+00:00"
    );
}
