use thiserror::Error;

/// Shown to the user whenever a live rate refresh fails.
pub const RATE_UPDATE_NOTICE: &str =
    "There was a problem updating our exchange rates. Please try again later.";

/// Failures of a live exchange rate fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No API key configured for the exchange rate provider")]
    MissingCredential,

    #[error("Malformed provider endpoint: {0}")]
    MalformedEndpoint(String),

    #[error("Transport error: {0}")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl FetchError {
    /// User-facing notice with the underlying error kept for diagnostics
    pub fn user_notice(&self) -> String {
        format!("{}\n\n({})", RATE_UPDATE_NOTICE, self)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::TransportError(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Exchange rate error: {0}")]
    RateFetch(#[from] FetchError),

    #[error("Parsing error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_notice_includes_detail() {
        let notice = FetchError::MissingCredential.user_notice();
        assert!(notice.starts_with(RATE_UPDATE_NOTICE));
        assert!(notice.contains("No API key configured"));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = FetchError::TransportError(Box::new(io));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "Transport error: refused");
    }

    #[test]
    fn test_fetch_error_converts_into_error() {
        let err: Error = FetchError::DecodeError("bad body".to_string()).into();
        assert!(matches!(err, Error::RateFetch(FetchError::DecodeError(_))));
    }
}
