//! Handing the finished preview to a rendering collaborator and saving what it produces.

mod pdf;

pub use pdf::PdfRenderer;

use crate::layout::Layout;
use crate::preview::InvoiceView;
use crate::{utils, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The name of the exported file.
pub const DEFAULT_FILENAME: &str = "Hillsville_Farms_Invoice.pdf";

/// Paper sizes a renderer can be asked for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

serde_plain::derive_display_from_serialize!(PageSize);
serde_plain::derive_fromstr_from_deserialize!(PageSize);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

serde_plain::derive_display_from_serialize!(Orientation);
serde_plain::derive_fromstr_from_deserialize!(Orientation);

/// The fixed configuration handed to a `Renderer` together with the preview.
///
/// Example, as it appears under `render` in `config.json`:
/// ```json
/// {
///   "filename": "Hillsville_Farms_Invoice.pdf",
///   "page_size": "a4",
///   "orientation": "portrait",
///   "margin_mm": 0.0,
///   "image_quality": 0.98,
///   "scale": 2,
///   "settle_ms": 1500
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RenderSettings {
    /// The name of the file written to the output directory.
    pub filename: String,
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// The margin between the page edge and the invoice. The invoice's own padding still applies.
    pub margin_mm: f32,
    /// Image quality, 0 to 1, for renderers that rasterize the invoice.
    pub image_quality: f32,
    /// Pixel density multiplier for renderers that rasterize the invoice.
    pub scale: u32,
    /// How long to wait after applying the print layout before rendering.
    pub settle_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: 0.0,
            image_quality: 0.98,
            scale: 2,
            settle_ms: 1500,
        }
    }
}

impl RenderSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// The page width and height in millimetres, after orientation.
    pub fn page_mm(&self) -> (f32, f32) {
        let (w, h) = match self.page_size {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        };
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Turns a finished invoice view into document bytes.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `view` as it appears under `layout`.
    async fn render(
        &self,
        view: &InvoiceView,
        layout: &Layout,
        settings: &RenderSettings,
    ) -> Result<Vec<u8>>;
}

/// Writes `bytes` to `dir/<settings.filename>`, creating `dir` if needed, and returns the path.
pub async fn save(bytes: &[u8], dir: &Path, settings: &RenderSettings) -> Result<PathBuf> {
    utils::make_dir(dir).await?;
    let path = dir.join(&settings.filename);
    utils::write(&path, bytes).await?;
    Ok(path)
}
