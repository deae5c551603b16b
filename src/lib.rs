//! Builds a single sales invoice (client details, at most five line items and a tax amount),
//! previews it and exports it as a PDF.
//!
//! The `Session` holds the state of one invoice. The `invoice` binary drives it from an
//! interactive shell, from command-line flags or from an MCP server.

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod export;
mod layout;
mod mcp;
pub mod model;
mod preview;
mod session;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use layout::{Layout, Padding, A4_WIDTH_PX};
pub use preview::{due_date, format_date, InvoiceView, PreviewRow, ViewSettings, DATE_FORMAT};
pub use session::{DisplayMode, ModeEvent, Session, SessionError, SessionSettings};
