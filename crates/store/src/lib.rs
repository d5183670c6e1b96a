//! Persistence layer for the checkout service.
//!
//! Defines the four store contracts the materializer coordinates on:
//! - [`Catalog`] — live product reads
//! - [`InventoryLedger`] — atomic conditional stock decrement/rollback
//! - [`ReservationStore`] — TTL-bound pending checkouts
//! - [`OrderRepository`] — durable orders with a unique gateway-order-id index
//!
//! Two implementations are provided: [`InMemoryStore`] for tests and
//! single-process use, and [`PostgresStore`] backed by sqlx.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod reservations;

pub use catalog::{Catalog, InventoryLedger, ReserveOutcome};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use orders::OrderRepository;
pub use postgres::PostgresStore;
pub use reservations::{DEFAULT_RESERVATION_TTL, ReservationStore, reservation_key};

/// The full store contract: all four concerns behind one cheaply
/// cloneable handle, as both provided implementations are.
pub trait Store:
    Catalog + InventoryLedger + ReservationStore + OrderRepository + Clone + Send + Sync + 'static
{
}

impl<T> Store for T where
    T: Catalog + InventoryLedger + ReservationStore + OrderRepository + Clone + Send + Sync + 'static
{
}
