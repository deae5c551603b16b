//! These structs provide the CLI interface for the invoice CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// invoice: build a sales invoice for Hillsville Farms and export it to PDF.
///
/// Enter the client's details and up to five line items, set the tax amount, check the preview
/// and export it as a PDF. Nothing you enter is saved between runs; the only file written is the
/// exported invoice.
///
/// There is also a mode in which an AI agent can build invoices with this program through the mcp
/// subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the invoice home directory and write a config.json holding the default settings.
    ///
    /// This is optional. Without a config.json every setting takes its default value. Edit the
    /// file afterwards to change the business name, currency symbols or the PDF settings.
    Init(InitArgs),
    /// Build an invoice interactively. Type `help` at the prompt for the list of commands.
    Shell,
    /// Build an invoice from flags, preview it and export it in one go.
    Render(RenderArgs),
    /// Run a Model Context Protocol server on stdin/stdout so that an AI agent can build invoices.
    Mcp,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and exports are held. Defaults to ~/invoice
    #[arg(long, env = "INVOICE_HOME", default_value_t = default_invoice_home())]
    invoice_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn invoice_home(&self) -> &DisplayPath {
        &self.invoice_home
    }
}

/// (Not shown): Args for the `invoice init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config.json with the defaults.
    #[arg(long)]
    force: bool,
}

impl InitArgs {
    pub fn force(&self) -> bool {
        self.force
    }
}

/// (Not shown): Args for the `invoice render` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct RenderArgs {
    /// The client's name.
    #[arg(long, default_value = "")]
    name: String,

    /// The client's address.
    #[arg(long, default_value = "")]
    address: String,

    /// The client's phone number.
    #[arg(long, default_value = "")]
    phone: String,

    /// The invoice number. Defaults to 0001.
    #[arg(long, default_value = "")]
    number: String,

    /// A line item written as "product | grade | unit price | quantity". Repeat for more items.
    #[arg(long = "item")]
    items: Vec<AddItemArgs>,

    /// The tax amount. Anything that is not a number counts as zero.
    #[arg(long, default_value = "")]
    tax: String,

    /// The invoice date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The directory to write the PDF to. Defaults to $INVOICE_HOME/exports
    #[arg(long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    pub fn new(client: crate::model::ClientDetails, items: Vec<AddItemArgs>, tax: &str) -> Self {
        Self {
            name: client.name,
            address: client.address,
            phone: client.phone,
            number: client.invoice_number,
            items,
            tax: tax.to_string(),
            date: None,
            output: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn client(&self) -> crate::model::ClientDetails {
        crate::model::ClientDetails {
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            invoice_number: self.number.clone(),
        }
    }

    pub fn items(&self) -> &[AddItemArgs] {
        &self.items
    }

    pub fn tax(&self) -> &str {
        &self.tax
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for adding a line item. The price and quantity are entered and validated as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "AddItemArgs")]
pub struct AddItemArgs {
    /// The product name, e.g. "Maize". Must not be empty.
    pub product: String,

    /// The product grade, e.g. "Grade A". Must not be empty.
    pub grade: String,

    /// The price of one unit, e.g. "1500" or "1,250.50". Must be greater than zero.
    pub unit_price: String,

    /// How many units, e.g. "20". Must be greater than zero.
    pub quantity: String,
}

impl AddItemArgs {
    pub fn new(
        product: impl Into<String>,
        grade: impl Into<String>,
        unit_price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            grade: grade.into(),
            unit_price: unit_price.into(),
            quantity: quantity.into(),
        }
    }
}

/// Parses `product | grade | unit price | quantity`.
impl FromStr for AddItemArgs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').map(str::trim).collect();
        match parts.as_slice() {
            [product, grade, unit_price, quantity] => {
                Ok(Self::new(*product, *grade, *unit_price, *quantity))
            }
            _ => Err(format!(
                "Expected 'product | grade | unit price | quantity' but got '{s}'"
            )),
        }
    }
}

/// Args for setting the tax amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "SetTaxArgs")]
pub struct SetTaxArgs {
    /// The tax amount as text, e.g. "250" or "1,000.00". Text that is not a number counts as
    /// zero, and so does a negative amount.
    pub tax: String,
}

/// Args for exporting the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "ExportArgs")]
pub struct ExportArgs {
    /// The directory to write the PDF to. Defaults to $INVOICE_HOME/exports
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_invoice_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("invoice"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --invoice-home or INVOICE_HOME instead of relying on the \
                default invoice home directory.",
            );
            PathBuf::from("invoice")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_from_str() {
        let item: AddItemArgs = " Maize | Grade A | 1,500 | 20 ".parse().unwrap();
        assert_eq!(item, AddItemArgs::new("Maize", "Grade A", "1,500", "20"));
    }

    #[test]
    fn test_item_from_str_wrong_arity() {
        assert!("Maize | Grade A | 1500".parse::<AddItemArgs>().is_err());
        assert!("a|b|c|d|e".parse::<AddItemArgs>().is_err());
    }

    #[test]
    fn test_item_keeps_empty_fields_for_validation() {
        let item: AddItemArgs = "Maize | | 1500 | 20".parse().unwrap();
        assert_eq!(item.grade, "");
    }

    #[test]
    fn test_parse_render_command() {
        let args = Args::try_parse_from([
            "invoice",
            "--invoice-home",
            "/tmp/inv",
            "render",
            "--name",
            "Ada Obi",
            "--item",
            "Maize|A|100|1",
            "--item",
            "Rice|B|250.50|1",
            "--tax",
            "25",
            "--date",
            "2024-12-25",
        ])
        .unwrap();
        assert_eq!(args.common().invoice_home().path(), Path::new("/tmp/inv"));
        let Command::Render(render) = args.command() else {
            panic!("expected the render command");
        };
        assert_eq!(render.client().name, "Ada Obi");
        assert_eq!(render.items().len(), 2);
        assert_eq!(render.tax(), "25");
        assert_eq!(render.date(), NaiveDate::from_ymd_opt(2024, 12, 25));
        assert!(render.output().is_none());
    }

    #[test]
    fn test_parse_log_level() {
        let args = Args::try_parse_from(["invoice", "--log-level", "debug", "shell"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::Shell));
    }

    #[test]
    fn test_export_args_default_directory() {
        let args: ExportArgs = serde_json::from_str("{}").unwrap();
        assert!(args.directory.is_none());
    }
}
