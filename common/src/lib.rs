use thiserror::Error;
use url::ParseError;

pub mod config;
pub mod logging;
pub mod models;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Forbidden - Access denied")]
    Forbidden,

    #[error("Gateway timeout")]
    GatewayTimeout,

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rule violation: {0}")]
    RuleViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::RateLimit | Error::GatewayTimeout => true,
            Error::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::InvalidInput(format!("URL parse error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(Error::RateLimit.is_transient());
        assert!(Error::GatewayTimeout.is_transient());
        assert!(
            Error::Upstream {
                status: 502,
                message: "bad gateway".into()
            }
            .is_transient()
        );
        assert!(
            !Error::Upstream {
                status: 404,
                message: "missing".into()
            }
            .is_transient()
        );
        assert!(!Error::Forbidden.is_transient());
        assert!(!Error::InvalidInput("x".into()).is_transient());
    }

    #[test]
    fn url_errors_become_invalid_input() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.starts_with("URL parse error")));
    }
}
