//! The read-only invoice view shown in preview mode and handed to the renderer on export.

use crate::model::{compute_totals, Amount, ClientDetails, Ledger, LineItem, TotalsSnapshot};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// The display format for invoice dates, e.g. `25/12/2024`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Formats `date` as `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The date payment is due: `issued` plus `days` calendar days.
pub fn due_date(issued: NaiveDate, days: u32) -> NaiveDate {
    issued
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// One row of the preview table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PreviewRow {
    Item {
        product: String,
        grade: String,
        unit_price: Amount,
        quantity: Decimal,
        amount: Amount,
    },
    /// A placeholder that keeps the table at a fixed height.
    Blank,
}

impl From<&LineItem> for PreviewRow {
    fn from(item: &LineItem) -> Self {
        PreviewRow::Item {
            product: item.product().to_string(),
            grade: item.grade().to_string(),
            unit_price: item.unit_price(),
            quantity: item.quantity(),
            amount: item.amount(),
        }
    }
}

/// A snapshot of everything printed on the invoice.
///
/// Client fields and dates are captured when the preview is opened. The rows and totals are
/// re-projected from the ledger with `refresh` before every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvoiceView {
    business_name: String,
    client_name: String,
    client_address: String,
    client_phone: String,
    invoice_number: String,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    rows: Vec<PreviewRow>,
    totals: TotalsSnapshot,
}

/// The inputs to `InvoiceView::project` that come from configuration rather than the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub business_name: String,
    pub default_invoice_number: String,
    pub due_days: u32,
}

impl InvoiceView {
    /// Builds the view from the session state as of `today`.
    pub fn project(
        settings: &ViewSettings,
        client: &ClientDetails,
        ledger: &Ledger,
        tax_input: &str,
        today: NaiveDate,
    ) -> Self {
        let mut view = Self {
            business_name: settings.business_name.clone(),
            client_name: client.name.clone(),
            client_address: client.address.clone(),
            client_phone: client.phone.clone(),
            invoice_number: client
                .invoice_number_or(&settings.default_invoice_number)
                .to_string(),
            invoice_date: today,
            due_date: due_date(today, settings.due_days),
            rows: Vec::new(),
            totals: TotalsSnapshot::default(),
        };
        view.refresh(ledger, tax_input);
        view
    }

    /// Recomputes the totals and copies the ledger rows into the table, padded with blank rows up
    /// to the ledger's capacity.
    pub fn refresh(&mut self, ledger: &Ledger, tax_input: &str) {
        let mut rows: Vec<PreviewRow> = ledger.rows().iter().map(PreviewRow::from).collect();
        let blanks = ledger.capacity().saturating_sub(rows.len());
        rows.extend(std::iter::repeat(PreviewRow::Blank).take(blanks));
        self.rows = rows;
        self.totals = compute_totals(ledger, tax_input);
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn client_phone(&self) -> &str {
        &self.client_phone
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn rows(&self) -> &[PreviewRow] {
        &self.rows
    }

    pub fn totals(&self) -> &TotalsSnapshot {
        &self.totals
    }
}
