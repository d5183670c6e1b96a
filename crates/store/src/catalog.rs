//! Catalog reads and the inventory ledger.

use async_trait::async_trait;
use domain::{Product, ProductId};

use crate::error::Result;

/// Outcome of a conditional stock reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Stock was decremented by the requested quantity.
    Reserved,

    /// Current stock was below the requested quantity; nothing changed.
    Insufficient,
}

/// Live product catalog reads.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches a product by id. `None` if the id is unknown.
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>>;
}

/// Atomic, per-product conditional stock mutation.
///
/// `reserve` must be a single conditional update ("decrement by `quantity`
/// only if current stock >= `quantity`"); implementations must not read
/// the stock level first and write second, because that races under
/// concurrent checkouts. Each line's decrement is independently atomic;
/// multi-line failure handling is the caller's compensation job.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Conditionally decrements stock. An unknown product id reports
    /// [`ReserveOutcome::Insufficient`].
    async fn reserve(&self, id: &ProductId, quantity: u32) -> Result<ReserveOutcome>;

    /// Compensating increment for a previously successful reserve.
    async fn release(&self, id: &ProductId, quantity: u32) -> Result<()>;
}
