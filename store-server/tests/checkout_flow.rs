//! End-to-end pipeline tests over a temporary on-disk database:
//! checkout → payment → completion → warranty provisioning, plus the
//! oversell property under concurrent checkouts.

use shared::models::{
    CheckoutLine, CheckoutRequest, Customer, CustomerCreate, OrderStatus, PaymentDisplayStatus,
    PaymentMethod, PaymentStatus, Product, ProductCreate,
};
use sqlx::SqlitePool;
use store_server::Config;
use store_server::db::DbService;
use store_server::db::repository::{RepoError, customer, order, payment, warranty};
use store_server::payments::{ChannelRegistry, ReconciliationResolver};
use store_server::warranty::provision_for_order;
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("store.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    (dir, db.pool)
}

async fn seed_product(pool: &SqlitePool, warranty_months: i64, stock: i64) -> Product {
    store_server::db::repository::product::create(
        pool,
        ProductCreate {
            name: "Electric Kettle".into(),
            price: 1000,
            warranty_months,
            initial_stock: stock,
        },
    )
    .await
    .expect("create product")
}

async fn seed_customer(pool: &SqlitePool) -> Customer {
    customer::create(
        pool,
        CustomerCreate {
            name: "Ada".into(),
            phone: None,
            address: None,
            email: Some("ada@example.com".into()),
        },
    )
    .await
    .expect("create customer")
}

fn request(customer_id: i64, product_id: i64, quantity: i64, method: PaymentMethod) -> CheckoutRequest {
    CheckoutRequest {
        customer_id,
        discount_amount: 0,
        payment_method: method,
        lines: vec![CheckoutLine {
            product_id,
            quantity,
            unit_price: 1000,
        }],
    }
}

#[tokio::test]
async fn full_pipeline_qr_payment_and_warranties() {
    let (_dir, pool) = setup().await;
    let product = seed_product(&pool, 12, 5).await;
    let buyer = seed_customer(&pool).await;

    // Checkout
    let placed = order::checkout(&pool, request(buyer.id, product.id, 3, PaymentMethod::QrTransfer))
        .await
        .unwrap();
    assert_eq!(placed.payable_amount, 3000);

    // Initiate QR payment: a PENDING ledger row plus a renderable payload
    let channels = ChannelRegistry::new(&Config::from_env()).unwrap();
    let channel = channels.get(PaymentMethod::QrTransfer).unwrap();
    let initiated = channel
        .initiate(&pool, &placed, placed.payable_amount, &Default::default())
        .await
        .unwrap();
    let reference = initiated.reference.clone().unwrap();
    assert_eq!(initiated.status, PaymentDisplayStatus::Pending);
    assert!(initiated.qr_payload.unwrap().contains(&reference));

    // Bank callback settles it; a duplicate callback cannot rewrite it
    payment::update_status_by_reference(&pool, &reference, PaymentStatus::Success, None)
        .await
        .unwrap();
    let dup = payment::update_status_by_reference(&pool, &reference, PaymentStatus::Failed, None)
        .await
        .unwrap_err();
    assert!(matches!(dup, RepoError::Conflict(_)));

    // Reconciliation now reads SUCCESS through the linked row
    let resolver = ReconciliationResolver::new(900_000);
    let view = resolver.resolve(&pool, &channels, &placed).await.unwrap();
    assert_eq!(view.status, PaymentDisplayStatus::Success);

    // Ship, complete, provision warranties (one per unit)
    order::update_status(&pool, placed.id, OrderStatus::Shipping).await.unwrap();
    order::update_status(&pool, placed.id, OrderStatus::Completed).await.unwrap();
    assert_eq!(provision_for_order(&pool, placed.id).await.unwrap(), 3);
    assert_eq!(provision_for_order(&pool, placed.id).await.unwrap(), 0);

    let granted = warranty::list_by_customer(&pool, buyer.id).await.unwrap();
    assert_eq!(granted.len(), 3);
    assert!(granted.iter().all(|w| w.purchase_date == placed.created_at));
}

#[tokio::test]
async fn concurrent_checkouts_never_oversell() {
    let (_dir, pool) = setup().await;
    let product = seed_product(&pool, 0, 5).await;
    let buyer = seed_customer(&pool).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let req = request(buyer.id, product.id, 1, PaymentMethod::Cod);
        handles.push(tokio::spawn(async move {
            order::checkout(&pool, req).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    // Stock accounts exactly for the committed checkouts, never below zero
    let remaining: i64 = sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(successes <= 5);
    assert!(successes >= 1);
    assert_eq!(remaining, 5 - successes);

    let committed = order::find_all(&pool, 50, 0).await.unwrap();
    assert_eq!(committed.len(), successes as usize);
}

#[tokio::test]
async fn cancel_after_checkout_restores_sellable_stock() {
    let (_dir, pool) = setup().await;
    let product = seed_product(&pool, 0, 2).await;
    let buyer = seed_customer(&pool).await;

    let placed = order::checkout(&pool, request(buyer.id, product.id, 2, PaymentMethod::Cod))
        .await
        .unwrap();

    // Sold out
    let err = order::checkout(&pool, request(buyer.id, product.id, 1, PaymentMethod::Cod))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InsufficientStock { available: 0, .. }));

    // Cancel frees the stock for the next buyer
    order::cancel(&pool, placed.id).await.unwrap();
    order::checkout(&pool, request(buyer.id, product.id, 2, PaymentMethod::Cod))
        .await
        .unwrap();
}
