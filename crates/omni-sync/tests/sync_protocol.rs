//! Sync protocol integration tests against an in-process mock remote
//! implementing the push/pull/delta/health wire contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use omni_core::{CartLine, CheckoutRequest, Customer, PaymentMethod, Product};
use omni_db::{Database, DbConfig};
use omni_sync::{
    bootstrap_if_first_run, pull_full, push_full, CloudClient, CloudConfig, SyncError, SyncHooks,
};

// =============================================================================
// Mock remote endpoint
// =============================================================================

#[derive(Default)]
struct MockRemote {
    snapshot: Option<Value>,
    deltas: Vec<Value>,
}

type Shared = Arc<Mutex<MockRemote>>;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn push(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().snapshot = Some(body);
    Json(json!({ "success": true }))
}

async fn pull(State(state): State<Shared>) -> Json<Value> {
    let snapshot = state.lock().unwrap().snapshot.clone().unwrap_or_else(|| {
        json!({ "products": [], "customers": [], "suppliers": [], "categories": [], "settings": [] })
    });
    Json(snapshot)
}

async fn delta(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    state.lock().unwrap().deltas.push(body);
    StatusCode::OK
}

/// Binds the mock on an ephemeral port; returns its base URL and state.
async fn spawn_mock() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockRemote::default()));

    let app = Router::new()
        .route("/test/health", get(health))
        .route("/sync/push", post(push))
        .route("/sync/pull", get(pull))
        .route("/sync/delta", post(delta))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

/// An address that refuses connections (bound then dropped).
async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// Local store helpers
// =============================================================================

async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    db.categories().insert("Fragrance").await.unwrap();
    db.engine()
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
            phone: None,
            address: None,
            debt: 1500,
            points: 60,
            barcode: None,
            next_payment_date: None,
            notes: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    db
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met within 2s");
}

fn client_for(url: &str) -> CloudClient {
    CloudClient::new(CloudConfig::new(url).timeout(Duration::from_secs(2))).unwrap()
}

// =============================================================================
// Health check
// =============================================================================

#[tokio::test]
async fn health_check_distinguishes_unreachable_from_rejected() {
    let (url, _state) = spawn_mock().await;
    client_for(&url).health_check().await.unwrap();

    // Wrong path prefix: the server answers 404 — rejected, not unreachable.
    let err = client_for(&format!("{url}/missing"))
        .health_check()
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Rejected { status: 404, .. }));

    // Nothing listening: unreachable.
    let err = client_for(&dead_endpoint().await)
        .health_check()
        .await
        .unwrap_err();
    assert!(err.is_unreachable());
}

// =============================================================================
// Full push / pull
// =============================================================================

#[tokio::test]
async fn push_then_pull_reproduces_rows_in_fresh_store() {
    let (url, _state) = spawn_mock().await;
    let client = client_for(&url);

    let source = seeded_db().await;
    push_full(&source, &client).await.unwrap();

    let target = Database::new(DbConfig::in_memory()).await.unwrap();
    pull_full(&target, &client).await.unwrap();

    let pushed = source.export_snapshot().await.unwrap();
    let pulled = target.export_snapshot().await.unwrap();

    // Equivalent rows in every syncable table, primary keys included
    // (the wire round-trips dates as ISO strings).
    assert_eq!(pushed.products, pulled.products);
    assert_eq!(pushed.customers, pulled.customers);
    assert_eq!(pushed.suppliers, pulled.suppliers);
    assert_eq!(pushed.categories, pulled.categories);
    assert_eq!(pushed.settings, pulled.settings);
}

#[tokio::test]
async fn pull_from_unreachable_endpoint_leaves_local_store_intact() {
    let source = seeded_db().await;
    let client = client_for(&dead_endpoint().await);

    let err = pull_full(&source, &client).await.unwrap_err();
    assert!(err.is_unreachable());

    // Local rows untouched by the failed pull.
    assert_eq!(source.products().count().await.unwrap(), 1);
}

// =============================================================================
// Live delta hooks
// =============================================================================

async fn enable_live_sync(db: &Database, url: &str) -> omni_core::StoreSettings {
    let mut settings = db.settings().get().await.unwrap();
    settings.live_sync_enabled = true;
    settings.cloud_api_url = Some(url.to_string());
    db.settings().update(&settings).await.unwrap();
    settings
}

#[tokio::test]
async fn checkout_fires_delta_for_each_mutated_entity() {
    let (url, state) = spawn_mock().await;
    let db = seeded_db().await;
    let settings = enable_live_sync(&db, &url).await;

    let mut hooks = SyncHooks::new(db.clone());
    hooks.apply_settings(&settings).unwrap();
    assert!(hooks.is_attached());

    let product = db.products().list().await.unwrap().remove(0);
    let customer = db.customers().list().await.unwrap().remove(0);

    db.engine()
        .checkout(&CheckoutRequest {
            lines: vec![CartLine {
                product_id: product.id,
                quantity: 2,
            }],
            customer_id: Some(customer.id),
            payment_method: PaymentMethod::Debt,
            redeem_points: false,
        })
        .await
        .unwrap();

    // One delta per mutated syncable entity: the product and the customer.
    wait_until(|| state.lock().unwrap().deltas.len() >= 2).await;

    let deltas = state.lock().unwrap().deltas.clone();
    let product_delta = deltas
        .iter()
        .find(|d| d["tableName"] == "products")
        .unwrap();
    assert_eq!(product_delta["operation"], "update");
    assert_eq!(product_delta["pkValue"], product.id);
    assert_eq!(product_delta["data"]["stock"], product.stock - 2);

    let customer_delta = deltas
        .iter()
        .find(|d| d["tableName"] == "customers")
        .unwrap();
    assert_eq!(customer_delta["data"]["debt"], customer.debt + 2 * product.price);

    hooks.detach();
    assert!(!hooks.is_attached());
}

#[tokio::test]
async fn attach_is_idempotent_and_settings_driven() {
    let (url, _state) = spawn_mock().await;
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let settings = enable_live_sync(&db, &url).await;

    let mut hooks = SyncHooks::new(db.clone());
    hooks.apply_settings(&settings).unwrap();
    hooks.apply_settings(&settings).unwrap();

    // A second attach must not add a second subscription.
    assert!(hooks.is_attached());
    assert_eq!(db.events().subscriber_count(), 1);

    // Either condition going false detaches immediately.
    let mut disabled = settings.clone();
    disabled.live_sync_enabled = false;
    hooks.apply_settings(&disabled).unwrap();
    assert!(!hooks.is_attached());

    // Detach again is a no-op.
    hooks.detach();
    assert!(!hooks.is_attached());
}

#[tokio::test]
async fn hooks_detach_on_drop() {
    let (url, _state) = spawn_mock().await;
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let settings = enable_live_sync(&db, &url).await;

    {
        let mut hooks = SyncHooks::new(db.clone());
        hooks.apply_settings(&settings).unwrap();
        assert_eq!(db.events().subscriber_count(), 1);
    }

    // Teardown released the subscription; give the abort a moment to land.
    wait_until(|| db.events().subscriber_count() == 0).await;
}

#[tokio::test]
async fn failed_delta_is_swallowed_and_local_write_stays_committed() {
    let db = seeded_db().await;
    let url = dead_endpoint().await;
    let settings = enable_live_sync(&db, &url).await;

    let mut hooks = SyncHooks::new(db.clone());
    hooks.apply_settings(&settings).unwrap();

    let product = db.products().list().await.unwrap().remove(0);
    db.engine()
        .checkout(&CheckoutRequest {
            lines: vec![CartLine {
                product_id: product.id,
                quantity: 1,
            }],
            customer_id: None,
            payment_method: PaymentMethod::Cash,
            redeem_points: false,
        })
        .await
        .unwrap();

    // The delta cannot be delivered; the committed local write must not be
    // rolled back and no error surfaces to the caller.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let fresh = db.products().get_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(fresh.stock, product.stock - 1);
}

// =============================================================================
// First-run bootstrap
// =============================================================================

#[tokio::test]
async fn bootstrap_pulls_once_on_first_run() {
    let (url, _state) = spawn_mock().await;
    let client = client_for(&url);

    // Remote already holds a store (with sync enabled in its settings, so
    // the pulled singleton keeps sync on).
    let source = seeded_db().await;
    enable_live_sync(&source, &url).await;
    push_full(&source, &client).await.unwrap();

    // Fresh store with sync enabled: bootstrap pulls.
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    enable_live_sync(&db, &url).await;

    assert!(bootstrap_if_first_run(&db).await.unwrap());
    assert_eq!(db.products().count().await.unwrap(), 1);

    // Store is no longer empty: the next startup does not pull again.
    assert!(!bootstrap_if_first_run(&db).await.unwrap());
}

#[tokio::test]
async fn bootstrap_skips_when_sync_disabled_and_survives_unreachable_remote() {
    // Disabled sync: nothing happens.
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    assert!(!bootstrap_if_first_run(&db).await.unwrap());

    // Enabled but unreachable: non-fatal, the app proceeds with local data.
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    enable_live_sync(&db, &dead_endpoint().await).await;
    assert!(!bootstrap_if_first_run(&db).await.unwrap());
    assert!(db.is_store_empty().await.unwrap());
}
