//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain::{
    Address, CustomerDetails, GatewayOrderId, Money, Order, OrderStatus, PricingPolicy, ProductId,
    Reservation, ReservedLine,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    Catalog, InventoryLedger, OrderRepository, PostgresStore, ReservationStore, ReserveOutcome,
    StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_checkout_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products, orders, pending_reservations")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed_product(store: &PostgresStore, id: &str, price_rupees: i64, stock: i32) {
    sqlx::query("INSERT INTO products (id, name, price_paise, stock) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("Product {id}"))
        .bind(price_rupees * 100)
        .bind(stock)
        .execute(store.pool())
        .await
        .unwrap();
}

fn sample_reservation(gateway_order_id: &str) -> Reservation {
    Reservation {
        gateway_order_id: GatewayOrderId::new(gateway_order_id),
        user_id: None,
        customer: CustomerDetails {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
        },
        shipping_address: Address {
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
        },
        lines: vec![ReservedLine {
            product_id: ProductId::new("prod-001"),
            name: "Widget".to_string(),
            unit_price: Money::from_rupees(1050),
            quantity: 2,
            image: None,
        }],
        pricing: PricingPolicy::default().price(Money::from_rupees(2100), Money::zero()),
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[serial]
async fn test_find_product_roundtrip() {
    let store = get_test_store().await;
    seed_product(&store, "prod-001", 1050, 5).await;

    let product = store
        .find_product(&ProductId::new("prod-001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.name, "Product prod-001");
    assert_eq!(product.price, Money::from_rupees(1050));
    assert_eq!(product.stock, 5);

    assert!(
        store
            .find_product(&ProductId::new("missing"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn test_conditional_decrement() {
    let store = get_test_store().await;
    seed_product(&store, "prod-001", 1050, 3).await;
    let id = ProductId::new("prod-001");

    assert_eq!(
        store.reserve(&id, 2).await.unwrap(),
        ReserveOutcome::Reserved
    );
    assert_eq!(
        store.reserve(&id, 2).await.unwrap(),
        ReserveOutcome::Insufficient
    );

    let product = store.find_product(&id).await.unwrap().unwrap();
    assert_eq!(product.stock, 1);

    store.release(&id, 2).await.unwrap();
    let product = store.find_product(&id).await.unwrap().unwrap();
    assert_eq!(product.stock, 3);
}

#[tokio::test]
#[serial]
async fn test_reserve_unknown_product_is_insufficient() {
    let store = get_test_store().await;
    assert_eq!(
        store
            .reserve(&ProductId::new("missing"), 1)
            .await
            .unwrap(),
        ReserveOutcome::Insufficient
    );
}

#[tokio::test]
#[serial]
async fn test_reservation_roundtrip_and_expiry() {
    let store = get_test_store().await;
    let reservation = sample_reservation("order_pg_ttl");

    store
        .put(&reservation, Duration::from_secs(3600))
        .await
        .unwrap();
    let fetched = store
        .get(&reservation.gateway_order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, reservation);

    // Re-put with an already-elapsed TTL; the row must be invisible.
    store
        .put(&reservation, Duration::from_secs(0))
        .await
        .unwrap();
    assert!(
        store
            .get(&reservation.gateway_order_id)
            .await
            .unwrap()
            .is_none()
    );

    assert_eq!(store.purge_expired_reservations().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_order_unique_gateway_order_id() {
    let store = get_test_store().await;
    let reservation = sample_reservation("order_pg_dup");

    let first = Order::from_reservation(&reservation, "cf_1".to_string());
    let second = Order::from_reservation(&reservation, "cf_1".to_string());

    store.insert(&first).await.unwrap();
    let err = store.insert(&second).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateOrder { .. }));

    let found = store
        .find_by_gateway_order_id(&reservation.gateway_order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
#[serial]
async fn test_order_status_update_and_delete() {
    let store = get_test_store().await;
    let reservation = sample_reservation("order_pg_status");
    let order = Order::from_reservation(&reservation, "cf_1".to_string());
    store.insert(&order).await.unwrap();

    let updated = store
        .update_status(
            order.id,
            OrderStatus::Shipped,
            Some("https://track.example/1".to_string()),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(
        updated.tracking_url.as_deref(),
        Some("https://track.example/1")
    );

    let updated = store
        .update_status(order.id, OrderStatus::Delivered, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        updated.tracking_url.as_deref(),
        Some("https://track.example/1")
    );

    store.delete_order(order.id).await.unwrap();
    assert!(store.find_by_id(order.id).await.unwrap().is_none());
}
