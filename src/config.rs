//! Configuration file handling for the invoice builder.
//!
//! The configuration file is stored at `$INVOICE_HOME/config.json` and holds the business name,
//! currency symbols, invoice defaults and the PDF render settings. The file is optional: when it
//! does not exist every setting takes its default value. Invoice data is never written here.

use crate::export::{PdfRenderer, RenderSettings};
use crate::model::{DEFAULT_CAPACITY, DEFAULT_INVOICE_NUMBER, MAX_CAPACITY};
use crate::preview::ViewSettings;
use crate::session::SessionSettings;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "invoice";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPORTS: &str = "exports";
const BUSINESS_NAME: &str = "Hillsville Farms";
const CURRENCY_SYMBOL: &str = "₦";
const PDF_CURRENCY_SYMBOL: &str = "NGN ";
const DUE_DAYS: u32 = 10;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$INVOICE_HOME` and from there it loads `$INVOICE_HOME/config.json` if it exists.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and writes a `config.json` holding the default settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists and `force` is false.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let root = dir.into();
        utils::make_dir(&root)
            .await
            .context("Unable to create the invoice home directory")?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() && !force {
            bail!(
                "The config file already exists at '{}', use --force to overwrite it",
                config_path.display()
            )
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Loads `$INVOICE_HOME/config.json`, or the default settings when the file does not exist.
    /// The home directory is not created.
    pub async fn load(invoice_home: impl Into<PathBuf>) -> Result<Self> {
        let root = invoice_home.into();
        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at '{}', using default settings",
                config_path.display()
            );
            ConfigFile::default()
        };
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where exported invoices are written unless another path is given.
    pub fn exports_dir(&self) -> PathBuf {
        match &self.config_file.exports_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.root.join(p),
            None => self.root.join(EXPORTS),
        }
    }

    pub fn business_name(&self) -> &str {
        &self.config_file.business_name
    }

    /// The currency symbol shown on screen.
    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.config_file.render
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            capacity: self.config_file.max_items,
            view: ViewSettings {
                business_name: self.config_file.business_name.clone(),
                default_invoice_number: self.config_file.default_invoice_number.clone(),
                due_days: self.config_file.due_days,
            },
        }
    }

    /// The PDF renderer configured with the PDF currency symbol.
    pub fn renderer(&self) -> PdfRenderer {
        PdfRenderer::new(self.config_file.pdf_currency_symbol.clone())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "invoice",
///   "config_version": 1,
///   "business_name": "Hillsville Farms",
///   "currency_symbol": "₦",
///   "pdf_currency_symbol": "NGN ",
///   "due_days": 10,
///   "max_items": 5,
///   "default_invoice_number": "0001",
///   "render": {
///     "filename": "Hillsville_Farms_Invoice.pdf",
///     "page_size": "a4",
///     "orientation": "portrait",
///     "margin_mm": 0.0,
///     "image_quality": 0.98,
///     "scale": 2,
///     "settle_ms": 1500
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct ConfigFile {
    /// Application name, should always be "invoice"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The name printed at the top of the invoice
    business_name: String,

    /// The currency symbol shown on screen
    currency_symbol: String,

    /// The currency symbol printed on the PDF. The builtin PDF fonts cannot draw "₦".
    pdf_currency_symbol: String,

    /// Days between the invoice date and the due date
    due_days: u32,

    /// The maximum number of line items on one invoice, at most what one page holds
    max_items: usize,

    /// The invoice number used when none is entered
    default_invoice_number: String,

    /// Where exports are written (optional, relative to the home directory or absolute).
    /// Defaults to $INVOICE_HOME/exports if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    exports_dir: Option<PathBuf>,

    /// Settings handed to the renderer on export
    render: RenderSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            business_name: BUSINESS_NAME.to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
            pdf_currency_symbol: PDF_CURRENCY_SYMBOL.to_string(),
            due_days: DUE_DAYS,
            max_items: DEFAULT_CAPACITY,
            default_invoice_number: DEFAULT_INVOICE_NUMBER.to_string(),
            exports_dir: None,
            render: RenderSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            (1..=MAX_CAPACITY).contains(&config.max_items),
            "Invalid max_items in config file: it must be between 1 and {MAX_CAPACITY}, got {}",
            config.max_items
        );
        anyhow::ensure!(
            !config.render.filename.trim().is_empty(),
            "Invalid render.filename in config file: it must not be empty"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
