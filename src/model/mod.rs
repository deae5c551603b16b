//! Types that represent the invoice data model, such as `Ledger` and `LineItem`.
mod amount;
mod client;
mod ledger;
mod line_item;
mod totals;

pub use amount::{Amount, AmountError};
pub use client::{ClientDetails, DEFAULT_INVOICE_NUMBER};
pub use ledger::{Field, Ledger, LedgerError, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use line_item::LineItem;
pub use totals::{compute_totals, TotalsSnapshot};
