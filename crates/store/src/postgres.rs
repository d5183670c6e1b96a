//! PostgreSQL-backed store implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{
    Address, CustomerDetails, GatewayOrderId, Order, OrderLine, OrderStatus, PriceBreakdown,
    Product, ProductId, Reservation,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result,
    catalog::{Catalog, InventoryLedger, ReserveOutcome},
    error::StoreError,
    orders::OrderRepository,
    reservations::{ReservationStore, reservation_key},
};

/// PostgreSQL implementation of all four store contracts.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Removes reservations whose TTL has elapsed, returning the count.
    ///
    /// `get` already filters expired rows, so this is a housekeeping
    /// sweep, not a correctness requirement.
    pub async fn purge_expired_reservations(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM pending_reservations WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let images: serde_json::Value = row.try_get("images")?;
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: domain::Money::from_paise(row.try_get("price_paise")?),
            stock: row.try_get::<i32, _>("stock")? as u32,
            images: serde_json::from_value(images)?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let customer: CustomerDetails = serde_json::from_value(row.try_get("customer")?)?;
        let shipping_address: Address = serde_json::from_value(row.try_get("shipping_address")?)?;
        let lines: Vec<OrderLine> = serde_json::from_value(row.try_get("lines")?)?;
        let pricing: PriceBreakdown = serde_json::from_value(row.try_get("pricing")?)?;
        let status: OrderStatus =
            serde_json::from_value(serde_json::Value::String(row.try_get("status")?))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: row
                .try_get::<Option<Uuid>, _>("user_id")?
                .map(domain::UserId::from_uuid),
            customer,
            shipping_address,
            lines,
            pricing,
            status,
            gateway_order_id: GatewayOrderId::new(row.try_get::<String, _>("gateway_order_id")?),
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            tracking_url: row.try_get("tracking_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Catalog for PostgresStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price_paise, stock, images FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }
}

#[async_trait]
impl InventoryLedger for PostgresStore {
    async fn reserve(&self, id: &ProductId, quantity: u32) -> Result<ReserveOutcome> {
        // Single conditional update; the WHERE clause is the stock check.
        let result =
            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                .bind(id.as_str())
                .bind(quantity as i32)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 1 {
            Ok(ReserveOutcome::Reserved)
        } else {
            Ok(ReserveOutcome::Insufficient)
        }
    }

    async fn release(&self, id: &ProductId, quantity: u32) -> Result<()> {
        sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(quantity as i32)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for PostgresStore {
    async fn put(&self, reservation: &Reservation, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_value(reservation)?;
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);

        sqlx::query(
            r#"
            INSERT INTO pending_reservations (key, payload, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
                SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(reservation_key(&reservation.gateway_order_id))
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &GatewayOrderId) -> Result<Option<Reservation>> {
        // Expired rows are invisible; the purge sweep collects them later.
        let row = sqlx::query(
            "SELECT payload FROM pending_reservations WHERE key = $1 AND expires_at > now()",
        )
        .bind(reservation_key(id))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(Some(serde_json::from_value(payload)?))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &GatewayOrderId) -> Result<()> {
        sqlx::query("DELETE FROM pending_reservations WHERE key = $1")
            .bind(reservation_key(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, customer, shipping_address, lines, pricing,
                status, gateway_order_id, gateway_payment_id, tracking_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.map(|u| u.as_uuid()))
        .bind(serde_json::to_value(&order.customer)?)
        .bind(serde_json::to_value(&order.shipping_address)?)
        .bind(serde_json::to_value(&order.lines)?)
        .bind(serde_json::to_value(&order.pricing)?)
        .bind(order.status.as_str())
        .bind(order.gateway_order_id.as_str())
        .bind(&order.gateway_payment_id)
        .bind(&order.tracking_url)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_gateway_order_id_key")
            {
                return StoreError::DuplicateOrder {
                    gateway_order_id: order.gateway_order_id.clone(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_gateway_order_id(&self, id: &GatewayOrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE gateway_order_id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_url: Option<String>,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2,
                tracking_url = COALESCE($3, tracking_url),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(tracking_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
