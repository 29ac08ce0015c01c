//! Numeric keypad editing the active cart line

use super::{Cart, LineEdit};
use crate::money::{MAX_PRICE, MAX_QUANTITY, parse_money, parse_quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypadMode {
    #[default]
    Quantity,
    Discount,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Backspace,
    Clear,
}

/// Keypad state: the mode and the text typed for the current target.
///
/// Digits append to the current value of the field (quantity 1, then `2`,
/// gives 12). A digit that would take quantity or price past its limit is
/// refused. Emptying the quantity removes the line.
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    mode: KeypadMode,
    buffer: String,
    /// Line the buffer was seeded from
    target: Option<usize>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> KeypadMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: KeypadMode) {
        self.mode = mode;
        self.target = None;
    }

    /// Apply a key press to the cart's active line. Returns false when there is
    /// nothing to edit or the key is not meaningful in this mode.
    pub fn press(&mut self, cart: &mut Cart, key: Key) -> bool {
        let Some(index) = cart.active_line() else {
            self.target = None;
            return false;
        };
        if self.target != Some(index) || !self.in_sync(cart, index) {
            self.buffer = Self::seed(cart, index, self.mode);
            self.target = Some(index);
        }

        match key {
            Key::Digit(d) if d <= 9 => {
                self.buffer.push(char::from(b'0' + d));
                if self.over_limit() {
                    self.buffer.pop();
                    return false;
                }
            }
            Key::Digit(_) => return false,
            Key::Point => {
                if self.mode == KeypadMode::Quantity || self.buffer.contains('.') {
                    return false;
                }
                self.buffer.push('.');
            }
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Clear => self.buffer.clear(),
        }

        let raw = self.buffer.trim_end_matches('.');
        let edit = match self.mode {
            KeypadMode::Quantity => LineEdit::Quantity(parse_quantity(raw)),
            KeypadMode::Discount => {
                let discount = parse_money(raw);
                if discount > Decimal::ONE_HUNDRED {
                    self.buffer = "100".to_string();
                }
                LineEdit::Discount(discount)
            }
            KeypadMode::Price => LineEdit::UnitPrice(parse_money(raw)),
        };
        let removes_line = matches!(edit, LineEdit::Quantity(q) if q <= 0);
        cart.set_line_field(index, edit);
        if removes_line {
            self.target = None;
        }
        true
    }

    /// Quantity or price typed so far exceeds what a line may hold
    fn over_limit(&self) -> bool {
        let raw = self.buffer.trim_end_matches('.');
        match self.mode {
            KeypadMode::Quantity => !raw
                .parse::<i64>()
                .is_ok_and(|q| q <= i64::from(MAX_QUANTITY)),
            KeypadMode::Price => !raw.parse::<Decimal>().is_ok_and(|p| p <= MAX_PRICE),
            KeypadMode::Discount => false,
        }
    }

    /// The buffer still reflects the line (it may have been edited elsewhere)
    fn in_sync(&self, cart: &Cart, index: usize) -> bool {
        let Some(line) = cart.lines().get(index) else {
            return false;
        };
        let raw = self.buffer.trim_end_matches('.');
        match self.mode {
            KeypadMode::Quantity => parse_quantity(raw) == line.quantity,
            KeypadMode::Discount => parse_money(raw) == line.discount_percent,
            KeypadMode::Price => parse_money(raw) == line.unit_price,
        }
    }

    fn seed(cart: &Cart, index: usize, mode: KeypadMode) -> String {
        let Some(line) = cart.lines().get(index) else {
            return String::new();
        };
        let value = match mode {
            KeypadMode::Quantity => return line.quantity.to_string(),
            KeypadMode::Discount => line.discount_percent,
            KeypadMode::Price => line.unit_price,
        };
        if value.is_zero() {
            String::new()
        } else {
            value.normalize().to_string()
        }
    }
}
