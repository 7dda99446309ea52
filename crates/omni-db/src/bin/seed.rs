//! Seeds a local OmniPOS database with demo data, exercising the same
//! engine paths the application uses (so movements and ledger rows come
//! out consistent).
//!
//! Usage: `cargo run -p omni-db --bin seed [path/to/store.db]`

use chrono::{Duration, Utc};

use omni_core::{CartLine, CheckoutRequest, Customer, PaymentMethod, Product, Supplier};
use omni_db::{Database, DbConfig, DbResult};

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "omnipos.db".to_string());

    let db = Database::new(DbConfig::new(&path)).await?;
    let engine = db.engine();
    let now = Utc::now();
    let last_week = now - Duration::days(7);

    for name in [
        "Men's Fragrance",
        "Women's Fragrance",
        "Essential Oils",
        "Accessories",
        "Incense & Oud",
    ] {
        db.categories().insert(name).await?;
    }

    let products = [
        ("Sauvage Elixir", 24_000, 18_000, 12, "Men's Fragrance"),
        ("Libre Eau de Parfum", 32_000, 26_000, 8, "Women's Fragrance"),
        ("Pure Musk Oil", 1_500, 800, 3, "Essential Oils"),
        ("Premium Oud (1 oz)", 12_000, 9_500, 25, "Incense & Oud"),
        ("Portable Incense Burner", 4_500, 3_000, 0, "Accessories"),
    ];

    let mut seeded = Vec::new();
    for (name, price, cost, stock, category) in products {
        let created = engine
            .create_product(&Product {
                id: 0,
                name: name.to_string(),
                price,
                cost,
                stock,
                category: category.to_string(),
                barcode: None,
                description: None,
                image: None,
                created_at: last_week,
            })
            .await?;
        seeded.push(created);
    }

    let customer = db
        .customers()
        .insert(&Customer {
            id: 0,
            name: "Ahmed M.".to_string(),
            phone: Some("0550123456".to_string()),
            address: Some("Downtown".to_string()),
            debt: 0,
            points: 120,
            barcode: None,
            next_payment_date: None,
            notes: None,
            created_at: last_week,
        })
        .await?;

    db.suppliers()
        .insert(&Supplier {
            id: 0,
            name: "Oriental Fragrances Co.".to_string(),
            phone: Some("021998877".to_string()),
            address: None,
            note: Some("Delivers every Thursday".to_string()),
            debt: 120_000,
            next_payment_date: Some(now + Duration::days(3)),
            created_at: last_week,
        })
        .await?;

    // A cash sale and a credit sale so the ledger has history.
    engine
        .checkout(&CheckoutRequest {
            lines: vec![CartLine {
                product_id: seeded[0].id,
                quantity: 2,
            }],
            customer_id: None,
            payment_method: PaymentMethod::Cash,
            redeem_points: false,
        })
        .await?;

    engine
        .checkout(&CheckoutRequest {
            lines: vec![CartLine {
                product_id: seeded[3].id,
                quantity: 1,
            }],
            customer_id: Some(customer.id),
            payment_method: PaymentMethod::Debt,
            redeem_points: false,
        })
        .await?;

    engine
        .record_expense(5_000, "Electricity bill", None)
        .await?;

    let products = db.products().count().await?;
    println!("Seeded {path}: {products} products, 1 customer, 1 supplier, 2 invoices");

    db.close().await;
    Ok(())
}
