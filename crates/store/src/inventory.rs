//! Inventory ledger contract.

use async_trait::async_trait;
use common::ProductId;
use domain::Product;
use rust_decimal::Decimal;

use crate::Result;

/// One product/quantity pair in a stock movement.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

impl StockLine {
    pub fn new(product_id: ProductId, quantity: Decimal) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Owns per-product stock and the rule that it never goes negative.
///
/// Products with `track_stock = false` are skipped silently by both
/// operations; they are treated as unlimited.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Decrements stock for every tracked line, all-or-nothing.
    ///
    /// Every line is validated before any write; if any tracked product
    /// would go negative the whole call fails with
    /// [`StoreError::InsufficientStock`](crate::StoreError::InsufficientStock)
    /// and no stock changes.
    async fn decrement_many(&self, lines: &[StockLine]) -> Result<()>;

    /// Increments stock for every tracked line.
    ///
    /// Restoration has no upper bound and always succeeds for existing
    /// products.
    async fn increment_many(&self, lines: &[StockLine]) -> Result<()>;

    /// Loads the inventory slice of a product.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>>;

    /// Inserts a product record.
    async fn insert_product(&self, product: Product) -> Result<()>;
}
