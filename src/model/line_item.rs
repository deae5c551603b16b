use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the invoice: a product of some grade, sold at a unit price in some quantity.
///
/// A `LineItem` can only be created by `Ledger::add_item`, which validates the inputs, so every
/// instance has a non-empty product and grade and a positive price and quantity. It is immutable
/// once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LineItem {
    product: String,
    grade: String,
    unit_price: Amount,
    quantity: Decimal,
    amount: Amount,
}

impl LineItem {
    /// Computes `amount` from `unit_price` and `quantity`. Callers validate first.
    pub(super) fn new(
        product: String,
        grade: String,
        unit_price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            product,
            grade,
            unit_price: Amount::new(unit_price),
            quantity,
            amount: Amount::new(unit_price * quantity),
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn unit_price(&self) -> Amount {
        self.unit_price
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// `unit_price × quantity`, exact.
    pub fn amount(&self) -> Amount {
        self.amount
    }
}
