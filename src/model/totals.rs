use crate::model::ledger::subtotal;
use crate::model::{Amount, Ledger};
use serde::Serialize;
use tracing::warn;

/// The subtotal, tax and total derived from a ledger and the tax input at one point in time.
///
/// This is never stored; it is recomputed from the ledger whenever it is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TotalsSnapshot {
    subtotal: Amount,
    tax: Amount,
    total: Amount,
}

impl TotalsSnapshot {
    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }

    pub fn tax(&self) -> Amount {
        self.tax
    }

    pub fn total(&self) -> Amount {
        self.total
    }
}

/// Sums the ledger's amounts and adds the tax parsed from `tax_input`.
///
/// `tax_input` is free text from the form. Blank or unparsable input counts as zero, and so does a
/// negative value, which is logged. The subtotal is the exact sum of the rows' stored amounts.
pub fn compute_totals(ledger: &Ledger, tax_input: &str) -> TotalsSnapshot {
    let subtotal = subtotal(ledger);
    let tax = resolve_tax(tax_input);
    let total = Amount::new(subtotal.value().saturating_add(tax.value()));
    TotalsSnapshot {
        subtotal,
        tax,
        total,
    }
}

fn resolve_tax(tax_input: &str) -> Amount {
    let tax = Amount::parse_lenient(tax_input);
    if tax.is_negative() {
        warn!("Ignoring negative tax '{tax_input}', using 0.00 instead");
        return Amount::ZERO;
    }
    tax
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ledger_with(rows: &[(&str, &str)]) -> Ledger {
        let mut ledger = Ledger::default();
        for (price, qty) in rows {
            ledger.add_item("Maize", "A", price, qty).unwrap();
        }
        ledger
    }

    #[test]
    fn test_totals_with_tax() {
        let ledger = ledger_with(&[("100.00", "1"), ("250.50", "1")]);
        let totals = compute_totals(&ledger, "25");
        assert_eq!(totals.subtotal().value(), dec("350.50"));
        assert_eq!(totals.tax().value(), dec("25.00"));
        assert_eq!(totals.total().value(), dec("375.50"));
        assert_eq!(totals.subtotal().to_string(), "350.50");
        assert_eq!(totals.tax().to_string(), "25.00");
        assert_eq!(totals.total().to_string(), "375.50");
    }

    #[test]
    fn test_malformed_tax_is_zero() {
        let ledger = ledger_with(&[("40", "3")]);
        for input in ["", "   ", "abc", "ten naira"] {
            let totals = compute_totals(&ledger, input);
            assert!(totals.tax().is_zero(), "{input}");
            assert_eq!(totals.total(), totals.subtotal(), "{input}");
        }
    }

    #[test]
    fn test_negative_tax_is_zero() {
        let ledger = ledger_with(&[("40", "3")]);
        let totals = compute_totals(&ledger, "-15");
        assert!(totals.tax().is_zero());
        assert_eq!(totals.total().value(), dec("120"));
    }

    #[test]
    fn test_formatted_tax_input_is_accepted() {
        let ledger = ledger_with(&[("1000", "2")]);
        let totals = compute_totals(&ledger, " ₦1,500.75 ");
        assert_eq!(totals.total().to_string(), "3,500.75");
    }

    #[test]
    fn test_subtotal_is_sum_of_price_times_quantity() {
        let rows = [("19.99", "3"), ("0.333", "3"), ("1250", "0.5"), ("7", "7")];
        let ledger = ledger_with(&rows);
        let expected: Decimal = rows.iter().map(|(p, q)| dec(p) * dec(q)).sum();
        let totals = compute_totals(&ledger, "");
        assert_eq!(totals.subtotal().value(), expected);

        // Reparsing the displayed subtotal gives back the same value to two places.
        let shown = totals.subtotal().with_symbol("₦");
        assert_eq!(Amount::parse_lenient(&shown).value(), totals.subtotal().rounded());
    }

    #[test]
    fn test_large_subtotal_is_exact_and_displayed_exactly() {
        let rows = [
            ("9,999,999,999,999.99", "1000"),
            ("123456789012.345", "7.5"),
            ("0.005", "3"),
        ];
        let ledger = ledger_with(&rows);
        let expected: Decimal = rows
            .iter()
            .map(|(p, q)| Amount::from_str(p).unwrap().value() * dec(q))
            .sum();
        let totals = compute_totals(&ledger, "₦1,000,000,000,000.005");
        assert_eq!(totals.subtotal().value(), expected);
        assert_eq!(totals.subtotal().to_string(), "10,000,925,925,917,582.60");
        assert_eq!(totals.total().to_string(), "10,001,925,925,917,582.61");

        for amount in [totals.subtotal(), totals.tax(), totals.total()] {
            let shown = amount.with_symbol("₦");
            assert_eq!(Amount::parse_lenient(&shown).value(), amount.rounded(), "{shown}");
        }
    }

    #[test]
    fn test_empty_ledger() {
        let totals = compute_totals(&Ledger::default(), "12.5");
        assert!(totals.subtotal().is_zero());
        assert_eq!(totals.total().to_string(), "12.50");
    }
}
