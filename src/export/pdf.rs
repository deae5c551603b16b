//! Implements the `Renderer` trait with `printpdf`, drawing the invoice as a single vector page.

use crate::export::{RenderSettings, Renderer};
use crate::layout::{Layout, A4_WIDTH_PX};
use crate::model::Amount;
use crate::preview::{format_date, InvoiceView, PreviewRow};
use crate::Result;
use anyhow::{anyhow, Context};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};
use std::io::BufWriter;
use tracing::debug;

const PT_TO_MM: f32 = 0.352_778;

/// Average Helvetica glyph width as a fraction of the font size. The builtin fonts carry no
/// metrics we can query, so right-aligned text uses this estimate.
const AVG_GLYPH_EM: f32 = 0.55;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const ROW_HEIGHT: f32 = 8.0;
const HEADER_BAND: f32 = 28.0;

/// Column starts as fractions of the content width: product, grade, unit price, quantity, amount.
const COLUMNS: [f32; 5] = [0.0, 0.30, 0.48, 0.68, 0.80];

/// Renders invoices to PDF using the builtin Helvetica fonts.
///
/// The builtin fonts only cover WinAnsi, so the currency symbol printed on the PDF is configured
/// separately from the one shown on screen.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    currency_symbol: String,
}

impl PdfRenderer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }
}

#[async_trait::async_trait]
impl Renderer for PdfRenderer {
    async fn render(
        &self,
        view: &InvoiceView,
        layout: &Layout,
        settings: &RenderSettings,
    ) -> Result<Vec<u8>> {
        let view = view.clone();
        let layout = layout.clone();
        let settings = settings.clone();
        let symbol = self.currency_symbol.clone();
        tokio::task::spawn_blocking(move || draw(&view, &layout, &settings, &symbol))
            .await
            .context("The PDF rendering task did not complete")?
    }
}

/// Where things go on the page, in millimetres from the bottom-left corner.
struct Frame {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Frame {
    /// Maps the layout's pixel width onto the printable width of the page and insets the content
    /// by the layout's padding.
    fn new(layout: &Layout, settings: &RenderSettings) -> Self {
        let (page_w, page_h) = settings.page_mm();
        let margin = settings.margin_mm;
        let width_px = layout.width_px.unwrap_or(A4_WIDTH_PX).max(1) as f32;
        let mm_per_px = (page_w - 2.0 * margin) / width_px;
        let padding = layout.padding;
        Self {
            left: margin + padding.left as f32 * mm_per_px,
            right: page_w - margin - padding.right as f32 * mm_per_px,
            top: page_h - margin - padding.top as f32 * mm_per_px,
            bottom: margin + padding.bottom as f32 * mm_per_px,
        }
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn column(&self, ix: usize) -> f32 {
        self.left + COLUMNS[ix] * self.width()
    }
}

struct Pen<'a> {
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl Pen<'_> {
    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), self.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), self.bold);
    }

    fn text_right(&self, text: &str, size: f32, x_right: f32, y: f32) {
        let x = (x_right - text_width_mm(text, size)).max(0.0);
        self.text(text, size, x, y);
    }

    fn bold_right(&self, text: &str, size: f32, x_right: f32, y: f32) {
        let x = (x_right - text_width_mm(text, size)).max(0.0);
        self.bold(text, size, x, y);
    }

    fn rule(&self, x1: f32, x2: f32, y: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn fill(&self, x: f32, y_top: f32, w: f32, h: f32, gray: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
        let rect = Rect::new(Mm(x), Mm(y_top - h), Mm(x + w), Mm(y_top)).with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// Shortens `text` to at most `max` characters so that it stays inside its column.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

fn draw(
    view: &InvoiceView,
    layout: &Layout,
    settings: &RenderSettings,
    symbol: &str,
) -> Result<Vec<u8>> {
    let (page_w, page_h) = settings.page_mm();
    let title = format!("Invoice {}", view.invoice_number());
    let (doc, page, layer) = PdfDocument::new(&title, Mm(page_w), Mm(page_h), "Invoice");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Unable to load the Helvetica font: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Unable to load the Helvetica Bold font: {e}"))?;
    let pen = Pen {
        layer: doc.get_page(page).get_layer(layer),
        regular: &regular,
        bold: &bold,
    };
    let frame = Frame::new(layout, settings);
    let money = |amount: Amount| amount.with_symbol(symbol);
    debug!(
        "Drawing {} on {}x{}mm, content {:.1}mm wide",
        title,
        page_w,
        page_h,
        frame.width()
    );

    // Header band
    pen.fill(frame.left, frame.top, frame.width(), HEADER_BAND, 0.93);
    let mut y = frame.top - 12.0;
    pen.bold(view.business_name(), TITLE_SIZE, frame.left + 4.0, y);
    pen.bold_right("INVOICE", TITLE_SIZE, frame.right - 4.0, y);
    y -= 9.0;
    pen.text_right(
        &format!("Invoice No: {}", view.invoice_number()),
        BODY_SIZE,
        frame.right - 4.0,
        y,
    );

    // Bill to, with the dates on the right
    y = frame.top - HEADER_BAND - 10.0;
    pen.bold("Bill To", HEADING_SIZE, frame.left, y);
    pen.text_right(
        &format!("Invoice Date: {}", format_date(view.invoice_date())),
        BODY_SIZE,
        frame.right,
        y,
    );
    y -= 6.0;
    pen.text(view.client_name(), BODY_SIZE, frame.left, y);
    pen.text_right(
        &format!("Due Date: {}", format_date(view.due_date())),
        BODY_SIZE,
        frame.right,
        y,
    );
    for line in [view.client_address(), view.client_phone()] {
        y -= 5.0;
        pen.text(line, BODY_SIZE, frame.left, y);
    }

    // Items table
    y -= 14.0;
    let headers = ["Product", "Grade", "Unit Price", "Quantity", "Amount"];
    pen.fill(frame.left, y + ROW_HEIGHT - 2.5, frame.width(), ROW_HEIGHT, 0.85);
    for (ix, header) in headers.iter().enumerate() {
        pen.bold(header, BODY_SIZE, frame.column(ix) + 1.5, y);
    }
    pen.rule(frame.left, frame.right, y - 2.5, 0.8);
    for row in view.rows() {
        y -= ROW_HEIGHT;
        if let PreviewRow::Item {
            product,
            grade,
            unit_price,
            quantity,
            amount,
        } = row
        {
            pen.text(&clip(product, 28), BODY_SIZE, frame.column(0) + 1.5, y);
            pen.text(&clip(grade, 16), BODY_SIZE, frame.column(1) + 1.5, y);
            pen.text(&money(*unit_price), BODY_SIZE, frame.column(2) + 1.5, y);
            pen.text(
                &quantity.normalize().to_string(),
                BODY_SIZE,
                frame.column(3) + 1.5,
                y,
            );
            pen.text_right(&money(*amount), BODY_SIZE, frame.right - 1.5, y);
        }
        pen.rule(frame.left, frame.right, y - 2.5, 0.3);
    }

    // Totals
    let totals = view.totals();
    let label_x = frame.column(3);
    for (label, value) in [("Subtotal", totals.subtotal()), ("Tax", totals.tax())] {
        y -= 7.0;
        pen.text(label, BODY_SIZE, label_x, y);
        pen.text_right(&money(value), BODY_SIZE, frame.right - 1.5, y);
    }
    y -= 3.0;
    pen.rule(label_x, frame.right, y, 0.8);
    y -= 6.0;
    pen.bold("Total", HEADING_SIZE, label_x, y);
    pen.bold_right(&money(totals.total()), HEADING_SIZE, frame.right - 1.5, y);

    pen.text(
        "Thank you for your business.",
        BODY_SIZE,
        frame.left,
        frame.bottom + 6.0,
    );

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| anyhow!("Unable to write the PDF document: {e}"))?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to flush the PDF document: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientDetails, Ledger};
    use crate::preview::ViewSettings;
    use chrono::NaiveDate;

    fn view() -> InvoiceView {
        let mut ledger = Ledger::default();
        ledger.add_item("Maize", "Grade A", "1500", "20").unwrap();
        ledger.add_item("Soybeans", "Grade B", "2250.75", "4").unwrap();
        InvoiceView::project(
            &ViewSettings {
                business_name: "Hillsville Farms".into(),
                default_invoice_number: "0001".into(),
                due_days: 10,
            },
            &ClientDetails {
                name: "Ada Obi".into(),
                address: "12 Market Road, Jos".into(),
                phone: "0803 000 0000".into(),
                invoice_number: "0042".into(),
            },
            &ledger,
            "500",
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
        )
    }

    #[test]
    fn test_frame_uses_print_padding() {
        let frame = Frame::new(&Layout::print(), &RenderSettings::default());
        let mm_per_px = 210.0 / 794.0;
        assert!((frame.left - 20.0 * mm_per_px).abs() < 0.01);
        assert!((frame.right - (210.0 - 20.0 * mm_per_px)).abs() < 0.01);
        assert!((frame.top - 297.0).abs() < 0.01);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Maize", 10), "Maize");
        assert_eq!(clip("Yellow maize, dried", 9), "Yellow...");
    }

    #[tokio::test]
    async fn test_render_produces_a_pdf() {
        let renderer = PdfRenderer::new("NGN ");
        let bytes = renderer
            .render(&view(), &Layout::print(), &RenderSettings::default())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
