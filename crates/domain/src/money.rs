//! Monetary rounding and order totals.
//!
//! All amounts are `rust_decimal::Decimal`; floats never touch money or
//! stock quantities.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds a monetary amount to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The monetary breakdown of an order.
///
/// Invariant: `total() = subtotal + tax + shipping - discount`, rounded to
/// two decimal places. Components are snapshots taken at intake and never
/// recomputed from live products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
}

impl OrderTotals {
    /// Computes the grand total from the components.
    pub fn total(&self) -> Decimal {
        round_money(self.subtotal + self.tax + self.shipping - self.discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(3)), dec!(3));
    }

    #[test]
    fn total_sums_components() {
        let totals = OrderTotals {
            subtotal: dec!(100.00),
            tax: dec!(14.98),
            shipping: dec!(9.95),
            discount: dec!(5.00),
        };
        assert_eq!(totals.total(), dec!(119.93));
    }

    #[test]
    fn total_rounds_result() {
        let totals = OrderTotals {
            subtotal: dec!(19.999),
            tax: dec!(0.001),
            ..Default::default()
        };
        assert_eq!(totals.total(), dec!(20.00));
    }
}
