// src/money.rs
//
// Pure commission math shared by the order ledger. All amounts are decimal
// major units of the system currency; conversion to integer minor units
// happens only at the payment-gateway boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub const DECIMAL_PLACES: u32 = 2;

/// Round a monetary amount to 2 decimal places, midpoint away from zero.
pub fn round2(value: Decimal) -> Decimal {
  value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// The revenue split for a single order line.
///
/// Invariant: `vendor_payout + platform_fee == item_revenue` exactly, since
/// the payout is derived by subtraction after the fee is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSplit {
  pub item_revenue: Decimal,
  pub platform_fee: Decimal,
  pub vendor_payout: Decimal,
}

pub fn split_line(unit_price: Decimal, quantity: i32, commission_rate: Decimal) -> LineSplit {
  let item_revenue = round2(unit_price * Decimal::from(quantity));
  let platform_fee = round2(item_revenue * commission_rate);
  let vendor_payout = item_revenue - platform_fee;
  LineSplit {
    item_revenue,
    platform_fee,
    vendor_payout,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
  pub subtotal: Decimal,
  pub platform_fee_total: Decimal,
  pub total: Decimal,
}

/// Aggregate order totals from per-line splits.
///
/// Per-line fees are rounded *before* summing; summing unrounded fees and
/// rounding once can disagree by one minor unit on multi-item orders.
pub fn order_totals<'a, I>(lines: I, shipping_cost: Decimal) -> OrderTotals
where
  I: IntoIterator<Item = &'a LineSplit>,
{
  let mut subtotal = Decimal::ZERO;
  let mut platform_fee_total = Decimal::ZERO;
  for line in lines {
    subtotal += line.item_revenue;
    platform_fee_total += line.platform_fee;
  }
  OrderTotals {
    subtotal,
    platform_fee_total,
    total: subtotal + shipping_cost,
  }
}

/// Convert a major-unit amount to integer minor units (the payment provider
/// requires them), rounding to the nearest unit.
pub fn to_minor_units(amount: Decimal) -> i64 {
  (amount * Decimal::ONE_HUNDRED)
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i64()
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
  }

  #[test]
  fn split_preserves_revenue_identity() {
    let rate = dec("0.10");
    for (price, qty) in [("99.99", 3), ("0.01", 1), ("1000", 2), ("17.77", 7), ("250.50", 4)] {
      let split = split_line(dec(price), qty, rate);
      assert_eq!(
        split.platform_fee + split.vendor_payout,
        split.item_revenue,
        "identity broken for {} x {}",
        price,
        qty
      );
      assert_eq!(split.platform_fee, round2(split.platform_fee));
    }
  }

  #[test]
  fn fee_rounds_per_line_before_summing() {
    let rate = dec("0.10");
    // 99.99 * 3 = 299.97, fee 29.997 -> 30.00; 0.01 fee 0.001 -> 0.00
    let a = split_line(dec("99.99"), 3, rate);
    let b = split_line(dec("0.01"), 1, rate);
    assert_eq!(a.platform_fee, dec("30.00"));
    assert_eq!(b.platform_fee, dec("0.00"));

    let totals = order_totals([a, b].iter(), Decimal::ZERO);
    assert_eq!(totals.subtotal, dec("299.98"));
    assert_eq!(totals.platform_fee_total, dec("30.00"));
    // Sum-then-round would have given round2(29.997 + 0.001) = 30.00 here,
    // but fee composition must come from the already-rounded lines.
    assert_eq!(totals.total, dec("299.98"));
  }

  #[test]
  fn totals_include_shipping() {
    let rate = dec("0");
    let line = split_line(dec("1000"), 2, rate);
    let totals = order_totals(std::iter::once(&line), dec("150"));
    assert_eq!(totals.subtotal, dec("2000"));
    assert_eq!(totals.platform_fee_total, dec("0"));
    assert_eq!(totals.total, dec("2150"));
  }

  #[test]
  fn minor_units_round_to_nearest() {
    assert_eq!(to_minor_units(dec("2000")), 200_000);
    assert_eq!(to_minor_units(dec("10.005")), 1001);
    assert_eq!(to_minor_units(dec("0.01")), 1);
    assert_eq!(to_minor_units(dec("0.004")), 0);
  }
}
