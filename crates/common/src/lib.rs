//! Shared types used across the checkout service crates.

mod types;

pub use types::OrderId;
