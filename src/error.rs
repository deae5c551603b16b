use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure that reaches a public boundary (the CLI, the shell or an MCP
/// tool result). The category is attached as the outermost context of the error so that callers
/// see what kind of thing went wrong before the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Loading or writing the configuration failed.
    Config,
    /// The user supplied input that was rejected; correct it and try again.
    Validation,
    /// Rendering the invoice to PDF failed.
    Export,
    /// A filesystem operation failed.
    Io,
    /// The MCP service could not be started or failed while running.
    Service,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "Configuration error",
            ErrorType::Validation => "Invalid input",
            ErrorType::Export => "Export failed",
            ErrorType::Io => "File error",
            ErrorType::Service => "Service error",
        };
        f.write_str(s)
    }
}

/// Tags any result with an `ErrorType` on its way out of a public function.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pub_result_keeps_the_cause() {
        let r: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk is full"));
        let e = r.pub_result(ErrorType::Io).unwrap_err();
        assert_eq!(e.to_string(), "File error");
        assert_eq!(format!("{e:#}"), "File error: disk is full");
    }
}
