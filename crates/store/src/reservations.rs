//! TTL-bound pending reservation storage.

use std::time::Duration;

use async_trait::async_trait;
use domain::{GatewayOrderId, Reservation};

use crate::error::Result;

/// Default reservation lifetime: one hour.
pub const DEFAULT_RESERVATION_TTL: Duration = Duration::from_secs(3600);

/// Namespaced storage key for a pending reservation.
pub fn reservation_key(id: &GatewayOrderId) -> String {
    format!("pending_order:{id}")
}

/// Short-lived durable storage for checkouts awaiting payment.
///
/// Entries outlive a single server process so a restarted or
/// horizontally scaled worker can complete a checkout started
/// elsewhere. Expiry is enforced by the store itself; `get` after the
/// TTL elapses returns `None`, which callers surface as a
/// session-expired outcome rather than an error.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Stores a reservation under its gateway order id with the given TTL.
    async fn put(&self, reservation: &Reservation, ttl: Duration) -> Result<()>;

    /// Fetches a live reservation. Expired or consumed entries are absent.
    async fn get(&self, id: &GatewayOrderId) -> Result<Option<Reservation>>;

    /// Removes a reservation. Removing an absent entry is a no-op.
    async fn delete(&self, id: &GatewayOrderId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_key_namespace() {
        let key = reservation_key(&GatewayOrderId::new("order_abc123"));
        assert_eq!(key, "pending_order:order_abc123");
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(DEFAULT_RESERVATION_TTL.as_secs(), 3600);
    }
}
