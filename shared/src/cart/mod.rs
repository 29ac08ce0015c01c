//! Register cart
//!
//! In-memory line items for one order that has not been submitted yet.
//! Every operation is total: bad indices are ignored, out-of-range values are
//! clamped (quantity and unit price included, to the limits the server accepts)
//! and unparsable input becomes zero, so the register never gets stuck.

mod keypad;

pub use keypad::{Key, Keypad, KeypadMode};

use crate::models::{Product, TableRef};
use crate::money::{
    LineAmounts, Totals, clamp_percent, clamp_price, clamp_quantity, line_amounts, parse_money,
    parse_quantity,
};
use crate::order::{CartSubmission, SubmissionError, SubmittedLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    /// May sit at 0 only while being typed; a line is removed when it reaches 0
    pub quantity: i32,
    /// Defaults to the product price, may be overridden
    pub unit_price: Decimal,
    /// 0 to 100
    pub discount_percent: Decimal,
    pub note: String,
}

impl CartLine {
    fn new(product: &Product, quantity: i32, note: &str) -> Self {
        Self {
            product: product.clone(),
            quantity: clamp_quantity(quantity),
            unit_price: clamp_price(product.price),
            discount_percent: Decimal::ZERO,
            note: note.to_string(),
        }
    }

    pub fn amounts(&self) -> LineAmounts {
        line_amounts(
            self.quantity,
            self.unit_price,
            self.discount_percent,
            self.product.tax_percentage,
        )
    }

    /// `quantity * unit_price * (1 - discount / 100)`
    pub fn line_total(&self) -> Decimal {
        self.amounts().subtotal
    }

    fn same_item(&self, product: &Product, note: &str) -> bool {
        self.product.id == product.id && self.note == note
    }
}

/// Editable line fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Quantity,
    Discount,
    UnitPrice,
}

/// A typed edit for one line field
#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    Quantity(i32),
    Discount(Decimal),
    UnitPrice(Decimal),
    Note(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    /// Line the keypad edits
    active: Option<usize>,
    pub customer_name: Option<String>,
    pub note: Option<String>,
    pub table: Option<TableRef>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn active_line(&self) -> Option<usize> {
        self.active
    }

    /// Add `quantity` of `product`, merging into an existing identical line.
    ///
    /// Returns the index of the line, now the active one.
    pub fn add_line(&mut self, product: &Product, quantity: i32) -> Option<usize> {
        self.add_line_with_note(product, quantity, "")
    }

    pub fn add_line_with_note(
        &mut self,
        product: &Product,
        quantity: i32,
        note: &str,
    ) -> Option<usize> {
        if quantity <= 0 {
            return None;
        }
        let index = match self.lines.iter().position(|l| l.same_item(product, note)) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = clamp_quantity(line.quantity.saturating_add(quantity));
                index
            }
            None => {
                self.lines.push(CartLine::new(product, quantity, note));
                self.lines.len() - 1
            }
        };
        self.active = Some(index);
        Some(index)
    }

    /// Apply an edit to line `index`. Returns false if there is no such line.
    pub fn set_line_field(&mut self, index: usize, edit: LineEdit) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        match edit {
            LineEdit::Quantity(quantity) => {
                if quantity <= 0 {
                    self.remove_line(index);
                } else {
                    line.quantity = clamp_quantity(quantity);
                }
            }
            LineEdit::Discount(discount) => line.discount_percent = clamp_percent(discount),
            LineEdit::UnitPrice(price) => line.unit_price = clamp_price(price),
            LineEdit::Note(note) => line.note = note,
        }
        true
    }

    /// Like [`Cart::set_line_field`] with raw operator input
    pub fn set_line_field_raw(&mut self, index: usize, field: LineField, raw: &str) -> bool {
        let edit = match field {
            LineField::Quantity => LineEdit::Quantity(parse_quantity(raw)),
            LineField::Discount => LineEdit::Discount(parse_money(raw)),
            LineField::UnitPrice => LineEdit::UnitPrice(parse_money(raw)),
        };
        self.set_line_field(index, edit)
    }

    /// Take one unit off line `index`; the last unit removes the line
    pub fn decrement_line(&mut self, index: usize) -> bool {
        match self.lines.get(index) {
            Some(line) => {
                let quantity = line.quantity - 1;
                self.set_line_field(index, LineEdit::Quantity(quantity))
            }
            None => false,
        }
    }

    /// Remove line `index`. The active selection moves to the previous line,
    /// or to none when the first line goes.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        self.active = match self.active {
            Some(active) if active == index => index.checked_sub(1),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        true
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.lines.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    /// Subtotal, discount, tax and total. Tax is per line at each product's rate.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for line in &self.lines {
            totals.add_line(&line.amounts());
        }
        totals
    }

    /// Empty the cart and drop customer, note and table
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the cart for submission under `session_id`
    pub fn to_submission(&self, session_id: &str) -> Result<CartSubmission, SubmissionError> {
        let submission = CartSubmission {
            session_id: session_id.to_string(),
            table_id: self.table.as_ref().map(|t| t.id.clone()),
            table_name: self.table.as_ref().map(|t| t.name.clone()),
            customer_id: None,
            customer_name: self.customer_name.clone(),
            note: self.note.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| SubmittedLine {
                    product_id: line.product.id.clone(),
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount_percent: line.discount_percent,
                    tax_percent: line.product.tax_percentage,
                    note: line.note.clone(),
                })
                .collect(),
        };
        submission.validate()?;
        Ok(submission)
    }
}
