//! The state of one invoice-building session and the transitions between its display modes.
//!
//! A `Session` lives for as long as the surface driving it: one `invoice shell`, one MCP server
//! process, or one `invoice render` invocation. Nothing in it is persisted.

use crate::export::{RenderSettings, Renderer};
use crate::layout::{Layout, LayoutGuard};
use crate::model::{compute_totals, ClientDetails, Ledger, LedgerError, LineItem, TotalsSnapshot};
use crate::preview::{InvoiceView, ViewSettings};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Which panel of the invoice surface is showing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Client and item entry is visible.
    #[default]
    Editing,
    /// The read-only invoice is visible and can be exported.
    Previewing,
}

serde_plain::derive_display_from_serialize!(DisplayMode);

/// A user action that moves between display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    ShowPreview,
    Back,
}

impl DisplayMode {
    /// The mode after `event`. Every event is accepted in every mode.
    pub fn transition(self, event: ModeEvent) -> DisplayMode {
        match (self, event) {
            (_, ModeEvent::ShowPreview) => DisplayMode::Previewing,
            (_, ModeEvent::Back) => DisplayMode::Editing,
        }
    }
}

/// Errors from session operations that are not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("The invoice is read-only while previewing, go back to make changes")]
    ReadOnly,

    #[error("Open the preview before exporting")]
    NotPreviewing,
}

/// Settings that shape a session, normally taken from `Config::session_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub capacity: usize,
    pub view: ViewSettings,
}

/// The explicit application state: the ledger, the form fields and the display mode.
#[derive(Debug, Clone)]
pub struct Session {
    settings: SessionSettings,
    ledger: Ledger,
    client: ClientDetails,
    tax_input: String,
    mode: DisplayMode,
    layout: Layout,
    preview: Option<InvoiceView>,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            ledger: Ledger::new(settings.capacity),
            settings,
            client: ClientDetails::default(),
            tax_input: String::new(),
            mode: DisplayMode::Editing,
            layout: Layout::editing(),
            preview: None,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rows(&self) -> &[LineItem] {
        self.ledger.rows()
    }

    pub fn client(&self) -> &ClientDetails {
        &self.client
    }

    pub fn tax_input(&self) -> &str {
        &self.tax_input
    }

    /// The preview captured by the last `show_preview`.
    pub fn preview(&self) -> Option<&InvoiceView> {
        self.preview.as_ref()
    }

    /// The current totals of the ledger and tax input.
    pub fn totals(&self) -> TotalsSnapshot {
        compute_totals(&self.ledger, &self.tax_input)
    }

    pub fn set_client(&mut self, client: ClientDetails) -> std::result::Result<(), SessionError> {
        self.ensure_editing()?;
        self.client = client;
        Ok(())
    }

    pub fn set_tax(
        &mut self,
        tax_input: impl Into<String>,
    ) -> std::result::Result<(), SessionError> {
        self.ensure_editing()?;
        self.tax_input = tax_input.into();
        Ok(())
    }

    /// Validates and appends a line item. See `Ledger::add_item`.
    pub fn add_item(
        &mut self,
        product: &str,
        grade: &str,
        unit_price: &str,
        quantity: &str,
    ) -> std::result::Result<LineItem, SessionError> {
        self.ensure_editing()?;
        let item = self.ledger.add_item(product, grade, unit_price, quantity)?;
        Ok(item.clone())
    }

    /// Snapshots the client fields, `today` and the due date into a fresh preview and switches to
    /// preview mode.
    pub fn show_preview(&mut self, today: NaiveDate) -> &InvoiceView {
        let view = InvoiceView::project(
            &self.settings.view,
            &self.client,
            &self.ledger,
            &self.tax_input,
            today,
        );
        self.apply(ModeEvent::ShowPreview);
        self.preview.insert(view)
    }

    /// Returns to editing. The ledger, client fields and the last preview are kept.
    pub fn back(&mut self) {
        self.apply(ModeEvent::Back);
    }

    /// Renders the preview with `renderer` and returns the document bytes.
    ///
    /// The preview rows and totals are refreshed from the ledger first. While rendering, the print
    /// layout is applied; the previous layout is restored afterwards whether rendering succeeds,
    /// fails or is abandoned.
    pub async fn export(
        &mut self,
        renderer: &dyn Renderer,
        settings: &RenderSettings,
    ) -> Result<Vec<u8>> {
        let view = match (self.mode, self.preview.as_mut()) {
            (DisplayMode::Previewing, Some(view)) => view,
            _ => return Err(SessionError::NotPreviewing.into()),
        };
        view.refresh(&self.ledger, &self.tax_input);

        let layout = LayoutGuard::apply(&mut self.layout, Layout::print());
        let settle = settings.settle();
        if !settle.is_zero() {
            debug!("Waiting {}ms for the layout to settle", settle.as_millis());
            tokio::time::sleep(settle).await;
        }
        let bytes = renderer
            .render(view, &layout, settings)
            .await
            .context("The renderer was unable to produce the invoice")?;
        drop(layout);

        debug!("Rendered {} bytes", bytes.len());
        Ok(bytes)
    }

    fn apply(&mut self, event: ModeEvent) {
        let next = self.mode.transition(event);
        debug!("Display mode {} -> {} on {:?}", self.mode, next, event);
        self.mode = next;
        self.layout = Layout::for_mode(next);
    }

    fn ensure_editing(&self) -> std::result::Result<(), SessionError> {
        match self.mode {
            DisplayMode::Editing => Ok(()),
            DisplayMode::Previewing => Err(SessionError::ReadOnly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use crate::test::{self, FailingRenderer, PendingRenderer, RecordingRenderer};
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session_with_items(n: usize) -> Session {
        let mut session = Session::new(test::session_settings());
        for i in 0..n {
            session
                .add_item(&format!("Item {i}"), "A", "10", "1")
                .unwrap();
        }
        session
    }

    #[test]
    fn test_transition_table() {
        use DisplayMode::*;
        use ModeEvent::*;
        assert_eq!(Editing.transition(ShowPreview), Previewing);
        assert_eq!(Previewing.transition(Back), Editing);
        assert_eq!(Previewing.transition(ShowPreview), Previewing);
        assert_eq!(Editing.transition(Back), Editing);
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(test::session_settings());
        assert_eq!(session.mode(), DisplayMode::Editing);
        assert_eq!(session.layout(), &Layout::editing());
        assert!(session.preview().is_none());
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_preview_and_back_keep_ledger() {
        let mut session = session_with_items(3);
        let before = session.rows().to_vec();

        session.show_preview(date(2024, 12, 25));
        assert_eq!(session.mode(), DisplayMode::Previewing);
        assert!(!session.layout().centered);
        assert_eq!(session.rows(), before.as_slice());

        session.back();
        assert_eq!(session.mode(), DisplayMode::Editing);
        assert!(session.layout().centered);
        assert_eq!(session.rows(), before.as_slice());

        session.show_preview(date(2024, 12, 26));
        session.back();
        assert_eq!(session.rows(), before.as_slice());
    }

    #[test]
    fn test_preview_snapshots_client_and_dates() {
        let mut session = session_with_items(1);
        session
            .set_client(ClientDetails {
                name: "Ada Obi".into(),
                invoice_number: "".into(),
                ..Default::default()
            })
            .unwrap();
        session.set_tax("25").unwrap();
        let view = session.show_preview(date(2024, 12, 25));
        assert_eq!(view.client_name(), "Ada Obi");
        assert_eq!(view.invoice_number(), "0001");
        assert_eq!(view.due_date(), date(2025, 1, 4));
        assert_eq!(view.totals().total().to_string(), "35.00");
    }

    #[test]
    fn test_preview_is_read_only() {
        let mut session = session_with_items(1);
        session.show_preview(date(2025, 1, 1));
        assert_eq!(
            session.add_item("Yam", "A", "1", "1").unwrap_err(),
            SessionError::ReadOnly
        );
        assert_eq!(session.set_tax("10").unwrap_err(), SessionError::ReadOnly);
        assert_eq!(
            session.set_client(ClientDetails::default()).unwrap_err(),
            SessionError::ReadOnly
        );
        assert_eq!(session.rows().len(), 1);
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let mut session = session_with_items(5);
        assert_eq!(
            session.add_item("Extra", "A", "1", "1").unwrap_err(),
            SessionError::Ledger(LedgerError::CapacityExceeded { capacity: 5 })
        );
        assert_eq!(
            Session::new(test::session_settings())
                .add_item("Yam", "", "1", "1")
                .unwrap_err(),
            SessionError::Ledger(LedgerError::EmptyField {
                field: Field::Grade
            })
        );
    }

    #[tokio::test]
    async fn test_export_requires_preview() {
        let mut session = session_with_items(1);
        let renderer = RecordingRenderer::default();
        let err = session
            .export(&renderer, &test::render_settings())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SessionError>(),
            Some(&SessionError::NotPreviewing)
        );
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_export_uses_print_layout_and_restores_it() {
        let mut session = session_with_items(2);
        session.show_preview(date(2025, 3, 1));
        let renderer = RecordingRenderer::default();

        let bytes = session
            .export(&renderer, &test::render_settings())
            .await
            .unwrap();

        assert_eq!(bytes, RecordingRenderer::BYTES);
        assert_eq!(renderer.calls(), 1);
        assert_eq!(renderer.last_layout(), Some(Layout::print()));
        assert_eq!(renderer.last_row_count(), Some(5));
        assert_eq!(session.layout(), &Layout::previewing());
        assert_eq!(session.mode(), DisplayMode::Previewing);
    }

    #[tokio::test]
    async fn test_export_restores_layout_when_renderer_fails() {
        let mut session = session_with_items(1);
        session.show_preview(date(2025, 3, 1));

        let err = session
            .export(&FailingRenderer, &test::render_settings())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("out of paper"));
        assert_eq!(session.layout(), &Layout::previewing());
    }

    #[tokio::test]
    async fn test_export_restores_layout_when_abandoned() {
        let mut session = session_with_items(1);
        session.show_preview(date(2025, 3, 1));

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            session.export(&PendingRenderer, &test::render_settings()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(session.layout(), &Layout::previewing());
    }

    #[tokio::test]
    async fn test_export_refreshes_rows_from_ledger() {
        let mut session = session_with_items(1);
        session.show_preview(date(2025, 3, 1));
        session.back();
        session.add_item("Rice", "B", "20", "2").unwrap();
        session.show_preview(date(2025, 3, 1));

        let renderer = RecordingRenderer::default();
        session
            .export(&renderer, &test::render_settings())
            .await
            .unwrap();
        let view = session.preview().unwrap();
        assert_eq!(view.totals().subtotal().to_string(), "50.00");
    }
}
