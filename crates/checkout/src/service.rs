//! The checkout service: reservation opening and idempotent order
//! materialization with compensation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::OrderId;
use domain::{
    Address, CartLine, CustomerDetails, GatewayOrderId, Money, Order, OrderStatus, PricingPolicy,
    Reservation, ReservedLine, UserId,
};
use gateway::{CreateSessionRequest, PaymentGateway, WebhookEvent, WebhookEventType};
use store::{ReserveOutcome, Store, StoreError};

use crate::dispatch::{EmailNotifier, FulfillmentService};
use crate::error::{CheckoutError, Result};

/// Checkout workflow settings.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Shipping fee schedule.
    pub pricing: PricingPolicy,

    /// Reservation lifetime; an abandoned checkout simply expires.
    pub reservation_ttl: Duration,

    /// Currency charged at the gateway.
    pub currency: String,

    /// Where the gateway sends the customer after payment.
    pub return_url: String,

    /// Webhook endpoint registered with the gateway, if any.
    pub notify_url: Option<String>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            reservation_ttl: store::DEFAULT_RESERVATION_TTL,
            currency: "INR".to_string(),
            return_url: "http://localhost:3000/checkout/return".to_string(),
            notify_url: None,
        }
    }
}

/// A client-submitted checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Authenticated user, if any; guests check out with `None`.
    pub user_id: Option<UserId>,
    pub customer: CustomerDetails,
    pub shipping_address: Address,
    pub lines: Vec<CartLine>,
}

/// An opened checkout session, ready for the gateway's payment page.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub gateway_order_id: GatewayOrderId,
    pub session_token: String,
    pub amount: Money,
}

/// Drives the checkout state machine.
///
/// Generic over the store (one type providing catalog, ledger,
/// reservation, and order persistence), the payment gateway, and the
/// two dispatch collaborators. No lock spans the workflow: the ledger's
/// conditional decrement and the unique index behind
/// [`StoreError::DuplicateOrder`] are the only coordination points.
pub struct CheckoutService<S, G, N, F> {
    store: S,
    gateway: G,
    notifier: Arc<N>,
    fulfillment: Arc<F>,
    config: CheckoutConfig,
}

impl<S, G, N, F> CheckoutService<S, G, N, F>
where
    S: Store,
    G: PaymentGateway,
    N: EmailNotifier + 'static,
    F: FulfillmentService + 'static,
{
    /// Creates a new checkout service.
    pub fn new(
        store: S,
        gateway: G,
        notifier: Arc<N>,
        fulfillment: Arc<F>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            fulfillment,
            config,
        }
    }

    /// Opens a checkout session: validates the cart against the live
    /// catalog, freezes pricing, reserves a gateway payment session,
    /// and stores the TTL-bound reservation.
    ///
    /// Nothing durable is written if the gateway call fails.
    #[tracing::instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn open_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        validate_request(&request)?;

        // Re-fetch every line from the catalog; client-supplied prices
        // are never trusted.
        let mut frozen = Vec::with_capacity(request.lines.len());
        let mut subtotal = Money::zero();
        for line in &request.lines {
            let product = self
                .store
                .find_product(&line.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(line.product_id.clone()))?;

            // Advisory fast-fail only; the ledger re-checks at
            // materialization and compensation handles the window in
            // between.
            if product.stock < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            subtotal += product.price.multiply(line.quantity);
            frozen.push(ReservedLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                image: product.primary_image().map(String::from),
            });
        }

        let pricing = self.config.pricing.price(subtotal, Money::zero());
        let gateway_order_id = GatewayOrderId::generate();

        let session = self
            .gateway
            .create_session(&CreateSessionRequest {
                gateway_order_id: gateway_order_id.clone(),
                amount: pricing.total,
                currency: self.config.currency.clone(),
                customer: request.customer.clone(),
                return_url: self.config.return_url.clone(),
                notify_url: self.config.notify_url.clone(),
            })
            .await?;

        let reservation = Reservation {
            gateway_order_id: gateway_order_id.clone(),
            user_id: request.user_id,
            customer: request.customer,
            shipping_address: request.shipping_address,
            lines: frozen,
            pricing,
            created_at: Utc::now(),
        };
        self.store
            .put(&reservation, self.config.reservation_ttl)
            .await?;

        metrics::counter!("checkout_sessions_opened_total").increment(1);
        tracing::info!(%gateway_order_id, total = %pricing.total, "checkout session opened");

        Ok(CheckoutSession {
            gateway_order_id,
            session_token: session.session_token,
            amount: pricing.total,
        })
    }

    /// Client-driven confirmation of a paid checkout.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(
        &self,
        gateway_order_id: &GatewayOrderId,
        requesting_user: Option<UserId>,
    ) -> Result<Order> {
        self.materialize(gateway_order_id, requesting_user).await
    }

    /// Processes a verified gateway webhook event.
    ///
    /// The caller has already checked the signature; this never runs
    /// on unauthenticated payloads.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.data.order.order_id))]
    pub async fn handle_webhook(&self, event: &WebhookEvent) -> Result<()> {
        metrics::counter!("webhook_events_total").increment(1);
        let gateway_order_id = GatewayOrderId::new(event.data.order.order_id.clone());

        match event.event_type {
            WebhookEventType::PaymentSuccess => {
                // The webhook carries no user identity; ownership is
                // not enforced on this path.
                self.materialize(&gateway_order_id, None).await?;
                Ok(())
            }
            WebhookEventType::PaymentFailed | WebhookEventType::PaymentUserDropped => {
                self.cancel_if_pending(&gateway_order_id).await
            }
            WebhookEventType::Other => Ok(()),
        }
    }

    /// Converts a paid reservation into a durable order exactly once.
    async fn materialize(
        &self,
        gateway_order_id: &GatewayOrderId,
        requesting_user: Option<UserId>,
    ) -> Result<Order> {
        let started = std::time::Instant::now();

        // 1. Idempotency: one order per payment session, ever.
        if let Some(existing) = self.store.find_by_gateway_order_id(gateway_order_id).await? {
            return Ok(existing);
        }

        // 2. Re-verify with the gateway; never trust the caller's claim.
        let attempts = self.gateway.fetch_payments(gateway_order_id).await?;
        let latest = attempts.first();
        let Some(paid) = latest.filter(|a| a.status.is_success()) else {
            // Reservation stays put so polling/retry can succeed later.
            return Err(CheckoutError::PaymentNotCompleted {
                status: latest.map(|a| a.status),
            });
        };

        // 3. Load the reservation; absence means expired or consumed.
        let Some(reservation) = self.store.get(gateway_order_id).await? else {
            return Err(CheckoutError::SessionExpired);
        };

        // 4. A paid session cannot be claimed by a different user.
        if let (Some(owner), Some(requester)) = (reservation.user_id, requesting_user)
            && owner != requester
        {
            return Err(CheckoutError::Forbidden);
        }

        // 5. Insert the order. The unique index on gateway_order_id is
        // the linearization point: losing this race means someone else
        // already materialized, which is success, not failure.
        let order = Order::from_reservation(&reservation, paid.payment_id.clone());
        match self.store.insert(&order).await {
            Ok(()) => {}
            Err(dup @ StoreError::DuplicateOrder { .. }) => {
                return self
                    .store
                    .find_by_gateway_order_id(gateway_order_id)
                    .await?
                    .ok_or(CheckoutError::Store(dup));
            }
            Err(e) => return Err(e.into()),
        }

        // 6. Apply the ledger line by line, compensating on failure.
        for (applied, line) in order.lines.iter().enumerate() {
            let outcome = match self.store.reserve(&line.product_id, line.quantity).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.compensate(&order, applied).await;
                    return Err(e.into());
                }
            };

            if outcome == ReserveOutcome::Insufficient {
                self.compensate(&order, applied).await;
                metrics::counter!("stock_conflicts_total").increment(1);
                tracing::warn!(
                    %gateway_order_id,
                    product_id = %line.product_id,
                    "stock ran out between reservation and materialization"
                );
                return Err(CheckoutError::StockConflict {
                    product_id: line.product_id.clone(),
                });
            }
        }

        // 7. Consume the reservation. If this delete fails the order is
        // already consistent with stock; the entry expires via TTL and
        // later confirmations hit the idempotency check, so log only.
        if let Err(e) = self.store.delete(gateway_order_id).await {
            tracing::warn!(%gateway_order_id, error = %e, "failed to delete consumed reservation");
        }

        self.spawn_dispatch(&order);

        metrics::counter!("orders_materialized_total").increment(1);
        metrics::histogram!("materialization_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, %gateway_order_id, "order materialized");

        Ok(order)
    }

    /// Reverses a partially applied materialization: already-decremented
    /// lines, the just-created order, and the reservation.
    async fn compensate(&self, order: &Order, applied: usize) {
        for line in order.lines[..applied].iter().rev() {
            if let Err(e) = self.store.release(&line.product_id, line.quantity).await {
                tracing::error!(
                    order_id = %order.id,
                    product_id = %line.product_id,
                    error = %e,
                    "compensation failed to restore stock"
                );
            }
        }

        if let Err(e) = self.store.delete_order(order.id).await {
            tracing::error!(order_id = %order.id, error = %e, "compensation failed to delete order");
        }

        if let Err(e) = self.store.delete(&order.gateway_order_id).await {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "compensation failed to delete reservation"
            );
        }
    }

    /// Cancels the pending order for a failed/abandoned payment, if one
    /// was already materialized. Nothing to do otherwise.
    async fn cancel_if_pending(&self, gateway_order_id: &GatewayOrderId) -> Result<()> {
        let Some(order) = self.store.find_by_gateway_order_id(gateway_order_id).await? else {
            return Ok(());
        };

        if order.status == OrderStatus::Pending {
            self.store
                .update_status(order.id, OrderStatus::Cancelled, None)
                .await?;
            tracing::info!(order_id = %order.id, %gateway_order_id, "pending order cancelled by gateway event");
        }

        Ok(())
    }

    /// Admin-driven status transition. Moving to shipped may attach a
    /// tracking URL and fires a shipping notification.
    #[tracing::instrument(skip(self, tracking_url))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
        tracking_url: Option<String>,
    ) -> Result<Order> {
        let order = self
            .store
            .find_by_id(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if !order.status.can_transition_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let updated = self
            .store
            .update_status(order_id, next, tracking_url)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if next == OrderStatus::Shipped {
            let notifier = self.notifier.clone();
            let order = updated.clone();
            tokio::spawn(async move {
                if let Err(e) = notifier.shipping_update(&order).await {
                    metrics::counter!("dispatch_failures_total").increment(1);
                    tracing::warn!(order_id = %order.id, error = %e, "shipping update failed");
                }
            });
        }

        Ok(updated)
    }

    /// Fetches an order by id.
    pub async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.store.find_by_id(order_id).await?)
    }

    /// Fires confirmation email and shipment creation without blocking
    /// or failing the materialization that triggered them.
    fn spawn_dispatch(&self, order: &Order) {
        let notifier = self.notifier.clone();
        let fulfillment = self.fulfillment.clone();
        let order = order.clone();

        tokio::spawn(async move {
            if let Err(e) = notifier.order_confirmation(&order).await {
                metrics::counter!("dispatch_failures_total").increment(1);
                tracing::warn!(order_id = %order.id, error = %e, "order confirmation failed");
            }
            if let Err(e) = fulfillment.create_shipment(&order).await {
                metrics::counter!("dispatch_failures_total").increment(1);
                tracing::warn!(order_id = %order.id, error = %e, "shipment creation failed");
            }
        });
    }
}

fn validate_request(request: &CheckoutRequest) -> Result<()> {
    if request.lines.is_empty() {
        return Err(CheckoutError::Validation("cart is empty".to_string()));
    }
    if request.lines.iter().any(|line| line.quantity == 0) {
        return Err(CheckoutError::Validation(
            "line quantity must be at least 1".to_string(),
        ));
    }
    if request.customer.name.trim().is_empty()
        || request.customer.email.trim().is_empty()
        || request.customer.phone.trim().is_empty()
    {
        return Err(CheckoutError::Validation(
            "customer name, email, and phone are required".to_string(),
        ));
    }
    if request.shipping_address.line1.trim().is_empty()
        || request.shipping_address.postal_code.trim().is_empty()
    {
        return Err(CheckoutError::Validation(
            "shipping address is incomplete".to_string(),
        ));
    }
    Ok(())
}
