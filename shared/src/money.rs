//! Money calculation utilities using rust_decimal for precision
//!
//! Every monetary value in the system is a [`Decimal`] rounded to two decimal
//! places (half away from zero). Per-line amounts are rounded first and the
//! order totals are sums of the rounded line amounts, so a total always equals
//! the sum of what is printed on its lines.

use std::num::IntErrorKind;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Decimal places kept for monetary values
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per line
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to two decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`, rounded. Saturates instead of overflowing.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    round_money(amount.saturating_mul(percent / HUNDRED))
}

/// Clamp a unit price into `[0, MAX_PRICE]`
pub fn clamp_price(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_PRICE)
}

/// Clamp a quantity into `[0, MAX_QUANTITY]`
pub fn clamp_quantity(value: i32) -> i32 {
    value.clamp(0, MAX_QUANTITY)
}

/// Clamp a percentage into `[0, 100]`
pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, HUNDRED)
}

/// Parse operator input leniently: anything that is not a number becomes zero.
pub fn parse_money(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim())
        .map(round_money)
        .unwrap_or(Decimal::ZERO)
}

/// Parse a quantity leniently: anything that is not an integer becomes zero.
///
/// Digits too large for an `i32` saturate rather than reading as zero.
pub fn parse_quantity(raw: &str) -> i32 {
    match raw.trim().parse::<i32>() {
        Ok(quantity) => quantity,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => i32::MAX,
        Err(_) => 0,
    }
}

/// Monetary breakdown of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineAmounts {
    /// `quantity * unit_price`
    pub gross: Decimal,
    /// Amount taken off by the line discount
    pub discount: Decimal,
    /// Line total after discount, before tax
    pub subtotal: Decimal,
    /// Tax at the line's own rate
    pub tax: Decimal,
}

impl LineAmounts {
    pub fn total(&self) -> Decimal {
        self.subtotal + self.tax
    }
}

/// Compute the amounts for one line.
///
/// Tax uses the rate of this line's product; there is no blended rate.
/// Quantity and price are held to `MAX_QUANTITY` and `MAX_PRICE`.
pub fn line_amounts(
    quantity: i32,
    unit_price: Decimal,
    discount_percent: Decimal,
    tax_percent: Decimal,
) -> LineAmounts {
    let quantity = Decimal::from(quantity.clamp(0, MAX_QUANTITY));
    let unit_price = clamp_price(unit_price);
    let exact = quantity.saturating_mul(unit_price);
    let gross = round_money(exact);
    let discount_percent = clamp_percent(discount_percent);
    let subtotal = round_money(exact.saturating_mul((HUNDRED - discount_percent) / HUNDRED));
    let tax = percent_of(subtotal, tax_percent);
    LineAmounts {
        gross,
        discount: gross - subtotal,
        subtotal,
        tax,
    }
}

/// Order level totals, the sum of rounded line amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn add_line(&mut self, line: &LineAmounts) {
        self.subtotal += line.subtotal;
        self.discount += line.discount;
        self.tax += line.tax;
        self.total = self.subtotal + self.tax;
    }
}

impl<'a> FromIterator<&'a LineAmounts> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a LineAmounts>>(iter: I) -> Self {
        let mut totals = Totals::default();
        for line in iter {
            totals.add_line(line);
        }
        totals
    }
}
