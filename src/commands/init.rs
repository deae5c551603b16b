use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the invoice home directory and writes a `config.json` holding the default settings.
///
/// # Arguments
/// - `invoice_home` - The directory that will hold the configuration and exports, e.g.
///   `$HOME/invoice`
/// - `force` - Overwrite an existing `config.json`
///
/// # Errors
/// - Returns an error if `config.json` exists and `force` is false.
/// - Returns an error if any file operations fail.
pub async fn init(invoice_home: &Path, force: bool) -> Result<Out<()>> {
    let config = Config::create(invoice_home, force)
        .await
        .context("Unable to create the invoice home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Wrote the default settings to {}",
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_twice() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("invoice");

        let out = init(&home, false).await.unwrap();
        assert!(out.message().contains("config.json"));

        let err = init(&home, false).await.unwrap_err();
        assert!(format!("{err:#}").starts_with("Configuration error"));

        assert!(init(&home, true).await.is_ok());
    }
}
