//! Catalog products and client-supplied cart lines.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// A product as it exists in the live catalog.
///
/// `price` is tax-inclusive; `stock` is the shared mutable resource
/// that only the inventory ledger may decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Tax-inclusive unit price.
    pub price: Money,

    /// Units currently in stock. Never negative by construction.
    pub stock: u32,

    /// Image URLs, first entry is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Returns the primary image URL, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A single line of a client-submitted cart.
///
/// Ephemeral: validated against the live catalog on every checkout
/// attempt and never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product being ordered.
    pub product_id: ProductId,

    /// Requested quantity.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a new cart line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}
