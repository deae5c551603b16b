//! The ledger is the ordered, bounded list of line items that backs an invoice.

use crate::model::{Amount, LineItem};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::debug;

/// The number of line items an invoice can hold.
pub const DEFAULT_CAPACITY: usize = 5;

/// The most line items that fit in the table of one printed page.
pub const MAX_CAPACITY: usize = 12;

/// The input fields checked by `Ledger::add_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Product,
    Grade,
    UnitPrice,
    Quantity,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::Product => "product",
            Field::Grade => "grade",
            Field::UnitPrice => "unit price",
            Field::Quantity => "quantity",
        };
        f.write_str(s)
    }
}

/// Why a line item was rejected. The ledger is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("The {field} must not be empty")]
    EmptyField { field: Field },

    #[error("The {field} must be a number greater than zero")]
    NonPositiveValue { field: Field },

    #[error("Maximum {capacity} items allowed")]
    CapacityExceeded { capacity: usize },

    #[error("The amount is too large to add to this invoice")]
    TooLarge,
}

/// An append-only list of at most `capacity` line items, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    items: Vec<LineItem>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Ledger {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Validates the raw form values and appends a new line item.
    ///
    /// The checks run in this order: capacity, then `product` and `grade` (which must be
    /// non-empty after trimming), then `unit_price` and `quantity` (which must parse as numbers
    /// greater than zero). Text that is not a number is treated as zero and so fails the
    /// positivity check.
    ///
    /// # Errors
    /// - `CapacityExceeded` when the ledger already holds `capacity` items.
    /// - `EmptyField` when `product` or `grade` is blank.
    /// - `NonPositiveValue` when `unit_price` or `quantity` is zero, negative or not a number.
    /// - `TooLarge` when the amount would overflow the invoice subtotal.
    pub fn add_item(
        &mut self,
        product: &str,
        grade: &str,
        unit_price: &str,
        quantity: &str,
    ) -> Result<&LineItem, LedgerError> {
        if self.is_full() {
            return Err(LedgerError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let product = non_empty(product, Field::Product)?;
        let grade = non_empty(grade, Field::Grade)?;
        let unit_price = positive(unit_price, Field::UnitPrice)?;
        let quantity = positive(quantity, Field::Quantity)?;

        // Decimal arithmetic panics on overflow, so the row amount and the running subtotal
        // are both checked before anything is stored.
        let fits = unit_price
            .checked_mul(quantity)
            .and_then(|amount| subtotal(self).value().checked_add(amount))
            .is_some();
        if !fits {
            return Err(LedgerError::TooLarge);
        }

        let item = LineItem::new(product, grade, unit_price, quantity);
        debug!(
            "Adding line item {} of {}: {} × {} = {}",
            self.items.len() + 1,
            self.capacity,
            item.unit_price(),
            item.quantity(),
            item.amount()
        );
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// The line items in the order they were added.
    pub fn rows(&self) -> &[LineItem] {
        &self.items
    }
}

fn non_empty(value: &str, field: Field) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn positive(value: &str, field: Field) -> Result<Decimal, LedgerError> {
    let parsed = Amount::parse_lenient(value).value();
    if parsed <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveValue { field });
    }
    Ok(parsed)
}

/// The sum of every row's amount.
pub(crate) fn subtotal(ledger: &Ledger) -> Amount {
    ledger.rows().iter().map(LineItem::amount).sum()
}
