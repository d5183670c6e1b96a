//! In-memory store implementation for testing and single-process use.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::OrderId;
use domain::{GatewayOrderId, Order, OrderStatus, Product, ProductId, Reservation};
use tokio::sync::RwLock;

use crate::{
    Result,
    catalog::{Catalog, InventoryLedger, ReserveOutcome},
    error::StoreError,
    orders::OrderRepository,
    reservations::{ReservationStore, reservation_key},
};

struct StoredReservation {
    reservation: Reservation,
    expires_at: Instant,
}

#[derive(Default)]
struct OrdersState {
    by_id: HashMap<OrderId, Order>,
    by_gateway: HashMap<GatewayOrderId, OrderId>,
}

/// In-memory implementation of all four store contracts.
///
/// Provides the same interface and semantics as the PostgreSQL
/// implementation: the conditional decrement happens inside one write
/// critical section, order insertion enforces gateway-order-id
/// uniqueness, and reservations expire on read.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    orders: Arc<RwLock<OrdersState>>,
    reservations: Arc<RwLock<HashMap<String, StoredReservation>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a catalog product.
    pub async fn seed_product(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }

    /// Returns the current stock level for a product.
    pub async fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.products.read().await.get(id).map(|p| p.stock)
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.by_id.len()
    }

    /// Returns the number of unexpired reservations.
    pub async fn reservation_count(&self) -> usize {
        let now = Instant::now();
        self.reservations
            .read()
            .await
            .values()
            .filter(|r| r.expires_at > now)
            .count()
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }
}

#[async_trait]
impl InventoryLedger for InMemoryStore {
    async fn reserve(&self, id: &ProductId, quantity: u32) -> Result<ReserveOutcome> {
        let mut products = self.products.write().await;

        // Check and decrement under the same write guard; this is the
        // in-memory equivalent of `UPDATE .. WHERE stock >= qty`.
        match products.get_mut(id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(ReserveOutcome::Reserved)
            }
            _ => Ok(ReserveOutcome::Insufficient),
        }
    }

    async fn release(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(id) {
            product.stock += quantity;
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn put(&self, reservation: &Reservation, ttl: Duration) -> Result<()> {
        let key = reservation_key(&reservation.gateway_order_id);
        self.reservations.write().await.insert(
            key,
            StoredReservation {
                reservation: reservation.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, id: &GatewayOrderId) -> Result<Option<Reservation>> {
        let key = reservation_key(id);
        let mut reservations = self.reservations.write().await;

        match reservations.get(&key) {
            Some(stored) if stored.expires_at > Instant::now() => {
                Ok(Some(stored.reservation.clone()))
            }
            Some(_) => {
                // Expire on read.
                reservations.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &GatewayOrderId) -> Result<()> {
        self.reservations.write().await.remove(&reservation_key(id));
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;

        if orders.by_gateway.contains_key(&order.gateway_order_id) {
            return Err(StoreError::DuplicateOrder {
                gateway_order_id: order.gateway_order_id.clone(),
            });
        }

        orders
            .by_gateway
            .insert(order.gateway_order_id.clone(), order.id);
        orders.by_id.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_gateway_order_id(&self, id: &GatewayOrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .by_gateway
            .get(id)
            .and_then(|order_id| orders.by_id.get(order_id))
            .cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_url: Option<String>,
    ) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        match orders.by_id.get_mut(&id) {
            Some(order) => {
                order.status = status;
                if tracking_url.is_some() {
                    order.tracking_url = tracking_url;
                }
                order.updated_at = chrono::Utc::now();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut orders = self.orders.write().await;
        if let Some(order) = orders.by_id.remove(&id) {
            orders.by_gateway.remove(&order.gateway_order_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::{Money, PricingPolicy};

    use super::*;

    fn widget(stock: u32) -> Product {
        Product {
            id: ProductId::new("prod-001"),
            name: "Widget".to_string(),
            price: Money::from_rupees(1050),
            stock,
            images: vec![],
        }
    }

    fn sample_reservation(gateway_order_id: &str) -> Reservation {
        Reservation {
            gateway_order_id: GatewayOrderId::new(gateway_order_id),
            user_id: None,
            customer: domain::CustomerDetails {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9999999999".to_string(),
            },
            shipping_address: domain::Address {
                line1: "12 MG Road".to_string(),
                line2: None,
                city: "Bengaluru".to_string(),
                state: "KA".to_string(),
                postal_code: "560001".to_string(),
            },
            lines: vec![],
            pricing: PricingPolicy::default().price(Money::from_rupees(2100), Money::zero()),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_reserve_decrements_conditionally() {
        let store = InMemoryStore::new();
        store.seed_product(widget(3)).await;
        let id = ProductId::new("prod-001");

        assert_eq!(
            store.reserve(&id, 2).await.unwrap(),
            ReserveOutcome::Reserved
        );
        assert_eq!(store.stock_of(&id).await, Some(1));

        assert_eq!(
            store.reserve(&id, 2).await.unwrap(),
            ReserveOutcome::Insufficient
        );
        assert_eq!(store.stock_of(&id).await, Some(1));
    }

    #[tokio::test]
    async fn test_reserve_unknown_product_is_insufficient() {
        let store = InMemoryStore::new();
        assert_eq!(
            store
                .reserve(&ProductId::new("missing"), 1)
                .await
                .unwrap(),
            ReserveOutcome::Insufficient
        );
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let store = InMemoryStore::new();
        store.seed_product(widget(3)).await;
        let id = ProductId::new("prod-001");

        store.reserve(&id, 3).await.unwrap();
        store.release(&id, 3).await.unwrap();
        assert_eq!(store.stock_of(&id).await, Some(3));
    }

    #[tokio::test]
    async fn test_concurrent_reserves_never_oversell() {
        let store = InMemoryStore::new();
        store.seed_product(widget(5)).await;
        let id = ProductId::new("prod-001");

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(
                async move { store.reserve(&id, 1).await.unwrap() },
            ));
        }

        let mut reserved = 0;
        for handle in handles {
            if handle.await.unwrap() == ReserveOutcome::Reserved {
                reserved += 1;
            }
        }

        assert_eq!(reserved, 5);
        assert_eq!(store.stock_of(&id).await, Some(0));
    }

    #[tokio::test]
    async fn test_reservation_ttl_expires_on_read() {
        let store = InMemoryStore::new();
        let reservation = sample_reservation("order_ttl");

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
        assert_eq!(store.reservation_count().await, 0);
    }

    #[tokio::test]
    async fn test_reservation_roundtrip_and_delete() {
        let store = InMemoryStore::new();
        let reservation = sample_reservation("order_live");

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

        store.delete(&reservation.gateway_order_id).await.unwrap();
        assert!(
            store
                .get(&reservation.gateway_order_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_gateway_order_id_rejected() {
        let store = InMemoryStore::new();
        let reservation = sample_reservation("order_dup");

        let first = Order::from_reservation(&reservation, "cf_1".to_string());
        let second = Order::from_reservation(&reservation, "cf_1".to_string());

        store.insert(&first).await.unwrap();
        let err = store.insert(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrder { .. }));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_status_and_tracking_url() {
        let store = InMemoryStore::new();
        let reservation = sample_reservation("order_status");
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

        // A later transition without a URL keeps the existing one.
        let updated = store
            .update_status(order.id, OrderStatus::Delivered, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.tracking_url.as_deref(),
            Some("https://track.example/1")
        );
    }

    #[tokio::test]
    async fn test_delete_order_frees_gateway_index() {
        let store = InMemoryStore::new();
        let reservation = sample_reservation("order_del");
        let order = Order::from_reservation(&reservation, "cf_1".to_string());
        store.insert(&order).await.unwrap();

        store.delete_order(order.id).await.unwrap();
        assert_eq!(store.order_count().await, 0);

        // Compensation frees the slot for a retry with a fresh order.
        let retry = Order::from_reservation(&reservation, "cf_2".to_string());
        store.insert(&retry).await.unwrap();
    }
}
