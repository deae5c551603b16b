use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The invoice number used when none is given.
pub const DEFAULT_INVOICE_NUMBER: &str = "0001";

/// Who the invoice is addressed to. These are free text and are copied into the preview as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ClientDetails {
    /// The client's name.
    #[serde(default)]
    pub name: String,

    /// The client's postal address.
    #[serde(default)]
    pub address: String,

    /// The client's phone number.
    #[serde(default)]
    pub phone: String,

    /// The invoice number. Left blank, the configured default (normally "0001") is used.
    #[serde(default)]
    pub invoice_number: String,
}

impl ClientDetails {
    /// The trimmed invoice number, or `default` if it is blank.
    pub fn invoice_number_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.invoice_number.trim() {
            "" => default,
            number => number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_defaults_when_blank() {
        let mut client = ClientDetails::default();
        assert_eq!(client.invoice_number_or(DEFAULT_INVOICE_NUMBER), "0001");
        client.invoice_number = "   ".into();
        assert_eq!(client.invoice_number_or(DEFAULT_INVOICE_NUMBER), "0001");
        client.invoice_number = " INV-042 ".into();
        assert_eq!(client.invoice_number_or(DEFAULT_INVOICE_NUMBER), "INV-042");
    }
}
