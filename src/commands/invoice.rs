//! The session operations shared by the shell, the render command and the MCP server.

use crate::args::{AddItemArgs, ExportArgs, SetTaxArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::export::{self, Renderer};
use crate::model::{Amount, ClientDetails, LineItem, TotalsSnapshot};
use crate::preview::{format_date, InvoiceView, PreviewRow};
use crate::{Config, Result, Session};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What `export_invoice` wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Replaces the client fields.
pub fn set_client(session: &mut Session, client: ClientDetails) -> Result<Out<ClientDetails>> {
    session
        .set_client(client)
        .pub_result(ErrorType::Validation)?;
    let client = session.client().clone();
    Ok(Out::new(
        format!("Billing {}", display_or(&client.name, "(no name)")),
        client,
    ))
}

/// Validates and appends a line item.
pub fn add_item(
    config: &Config,
    session: &mut Session,
    args: &AddItemArgs,
) -> Result<Out<LineItem>> {
    let item = session
        .add_item(&args.product, &args.grade, &args.unit_price, &args.quantity)
        .pub_result(ErrorType::Validation)?;
    let symbol = config.currency_symbol();
    let message = format!(
        "Added {} ({}): {} x {} = {}, {} of {} items",
        item.product(),
        item.grade(),
        item.quantity().normalize(),
        item.unit_price().with_symbol(symbol),
        item.amount().with_symbol(symbol),
        session.ledger().len(),
        session.ledger().capacity()
    );
    Ok(Out::new(message, item))
}

/// Lists the line items in the order they were added.
pub fn list_items(config: &Config, session: &Session) -> Result<Out<Vec<LineItem>>> {
    let rows = session.rows().to_vec();
    if rows.is_empty() {
        return Ok(Out::new("No items yet", rows));
    }
    let symbol = config.currency_symbol();
    let message = rows
        .iter()
        .enumerate()
        .map(|(ix, item)| {
            format!(
                "{}. {} | {} | {} | {} | {}",
                ix + 1,
                item.product(),
                item.grade(),
                item.unit_price().with_symbol(symbol),
                item.quantity().normalize(),
                item.amount().with_symbol(symbol)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, rows))
}

/// Stores the tax input and reports the totals it produces.
pub fn set_tax(
    config: &Config,
    session: &mut Session,
    args: &SetTaxArgs,
) -> Result<Out<TotalsSnapshot>> {
    session
        .set_tax(args.tax.as_str())
        .pub_result(ErrorType::Validation)?;
    totals(config, session)
}

/// Reports the subtotal, tax and total.
pub fn totals(config: &Config, session: &Session) -> Result<Out<TotalsSnapshot>> {
    let totals = session.totals();
    Ok(Out::new(describe_totals(&totals, config.currency_symbol()), totals))
}

/// Opens the preview for `today` and describes it.
pub fn preview(
    config: &Config,
    session: &mut Session,
    today: NaiveDate,
) -> Result<Out<InvoiceView>> {
    let view = session.show_preview(today).clone();
    Ok(Out::new(describe(&view, config.currency_symbol()), view))
}

/// Goes back to editing.
pub fn back(session: &mut Session) -> Result<Out<()>> {
    session.back();
    Ok("Back to editing, your items are unchanged".into())
}

/// Renders the previewed invoice and writes it to the requested directory, or to the exports
/// directory of `config`.
pub async fn export_invoice(
    config: &Config,
    session: &mut Session,
    renderer: &dyn Renderer,
    args: &ExportArgs,
) -> Result<Out<ExportReceipt>> {
    let settings = config.render_settings();
    let bytes = session
        .export(renderer, settings)
        .await
        .pub_result(ErrorType::Export)?;
    let dir = args
        .directory
        .clone()
        .unwrap_or_else(|| config.exports_dir());
    let path = export::save(&bytes, &dir, settings)
        .await
        .pub_result(ErrorType::Io)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(Out::new(
        format!("Saved the invoice to {}", path.display()),
        ExportReceipt {
            path,
            bytes: bytes.len(),
        },
    ))
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn describe_totals(totals: &TotalsSnapshot, symbol: &str) -> String {
    format!(
        "Subtotal: {}, Tax: {}, Total: {}",
        totals.subtotal().with_symbol(symbol),
        totals.tax().with_symbol(symbol),
        totals.total().with_symbol(symbol)
    )
}

/// A plain-text rendering of the preview.
fn describe(view: &InvoiceView, symbol: &str) -> String {
    let money = |a: Amount| a.with_symbol(symbol);
    let mut lines = vec![
        format!("{}  INVOICE  No: {}", view.business_name(), view.invoice_number()),
        format!(
            "Invoice Date: {}  Due Date: {}",
            format_date(view.invoice_date()),
            format_date(view.due_date())
        ),
        format!("Bill To: {}", display_or(view.client_name(), "-")),
    ];
    for line in [view.client_address(), view.client_phone()] {
        if !line.trim().is_empty() {
            lines.push(format!("         {line}"));
        }
    }
    lines.push("Product | Grade | Unit Price | Quantity | Amount".to_string());
    for row in view.rows() {
        lines.push(match row {
            PreviewRow::Item {
                product,
                grade,
                unit_price,
                quantity,
                amount,
            } => format!(
                "{product} | {grade} | {} | {} | {}",
                money(*unit_price),
                quantity.normalize(),
                money(*amount)
            ),
            PreviewRow::Blank => "-".to_string(),
        });
    }
    lines.push(describe_totals(view.totals(), symbol));
    lines.join("\n")
}
