//! Origin class of an order.

use serde::{Deserialize, Serialize};

/// Prefix assigned to customer self-checkout order numbers.
pub const CHECKOUT_PREFIX: &str = "ORD-";

/// The category an order belongs to, which decides *when* inventory is
/// adjusted.
///
/// Checkout orders defer the stock decrement to first delivery; staff
/// sales commit stock when confirmed. The class is derived from the order
/// number prefix exactly once, at creation, and stored on the order; no
/// business rule re-parses the number afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    /// Customer self-checkout (`ORD-` order numbers).
    Checkout,

    /// Staff-entered sale (any other prefix).
    StaffSale,
}

impl OriginClass {
    /// Classifies an order number by its prefix.
    pub fn from_order_number(order_number: &str) -> Self {
        if order_number.starts_with(CHECKOUT_PREFIX) {
            OriginClass::Checkout
        } else {
            OriginClass::StaffSale
        }
    }

    /// Returns the class name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginClass::Checkout => "checkout",
            OriginClass::StaffSale => "staff_sale",
        }
    }
}

impl std::fmt::Display for OriginClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ord_prefix_is_checkout() {
        assert_eq!(
            OriginClass::from_order_number("ORD-20260823-0001"),
            OriginClass::Checkout
        );
    }

    #[test]
    fn other_prefixes_are_staff_sales() {
        assert_eq!(
            OriginClass::from_order_number("ADMIN-SALE-1"),
            OriginClass::StaffSale
        );
        assert_eq!(
            OriginClass::from_order_number("POS-42"),
            OriginClass::StaffSale
        );
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        // "ord-" is not a checkout number; the generator always emits "ORD-".
        assert_eq!(
            OriginClass::from_order_number("ord-1"),
            OriginClass::StaffSale
        );
    }
}
