//! Inventory-relevant slice of the product record.

use common::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as the inventory ledger sees it.
///
/// `stock` must never go negative. Products with `track_stock = false` are
/// exempt from all decrement and restore logic and are treated as having
/// unlimited availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: Decimal,
    pub track_stock: bool,
    pub is_active: bool,
}

impl Product {
    /// Returns true if `quantity` units are available to reserve.
    ///
    /// Untracked products are always available; this check never mutates
    /// stock.
    pub fn has_available(&self, quantity: Decimal) -> bool {
        !self.track_stock || self.stock >= quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(stock: Decimal, track_stock: bool) -> Product {
        Product {
            id: ProductId::new(),
            sku: "SKU-001".to_string(),
            name: "Saffron, 1g".to_string(),
            price: dec!(12.50),
            stock,
            track_stock,
            is_active: true,
        }
    }

    #[test]
    fn tracked_product_checks_stock() {
        let p = product(dec!(5), true);
        assert!(p.has_available(dec!(5)));
        assert!(!p.has_available(dec!(5.1)));
    }

    #[test]
    fn untracked_product_is_always_available() {
        let p = product(dec!(0), false);
        assert!(p.has_available(dec!(1000)));
    }

    #[test]
    fn fractional_quantities_are_supported() {
        let p = product(dec!(2.5), true);
        assert!(p.has_available(dec!(2.5)));
        assert!(!p.has_available(dec!(2.51)));
    }
}
