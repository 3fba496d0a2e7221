//! Custom error types for Maildown
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Maildown operations
#[derive(Error, Debug)]
pub enum MaildownError {
    /// No credentials were found in any of the supported sources
    #[error(
        "No credentials supplied - you must either provide the access key and secret key \
         values, set the environment variables `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`, \
         or run `aws configure` and try again"
    )]
    MissingCredentials,

    /// The provider rejected the supplied credentials
    #[error("The supplied credentials are not valid: {0}")]
    InvalidCredentials(String),

    /// The AWS credentials file could not be used
    #[error("Cannot find expected keys in credentials file stored at {path}: {reason}")]
    CredentialsFile { path: String, reason: String },

    /// The config file exists but cannot be parsed
    #[error("Config file {path} is corrupt: {reason}")]
    ConfigCorrupt { path: String, reason: String },

    /// The theme stylesheet could not be read
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    /// Neither or both of content and file path were given
    #[error("You must provide either the content or file_path argument only")]
    AmbiguousContent,

    /// A send was attempted without recipients
    #[error("You must supply at least one recipient")]
    NoRecipients,

    /// The requested backend does not exist
    #[error("No backend called {0} exists")]
    UnknownBackend(String),

    /// A remote call to the provider failed
    #[error("{code} ({status}): {message}")]
    ProviderRequest {
        code: String,
        message: String,
        status: u16,
    },

    /// Markdown rendering, templating or CSS inlining failed
    #[error("Render error: {0}")]
    Render(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl MaildownError {
    /// Create a provider error for a failed HTTP exchange
    pub fn http(message: impl Into<String>) -> Self {
        Self::ProviderRequest {
            code: "HttpError".into(),
            message: message.into(),
            status: 0,
        }
    }

    /// Check if this error was caused by bad user input rather than a failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousContent | Self::NoRecipients | Self::UnknownBackend(_)
        )
    }

    /// Check if this is an error response returned by the provider itself
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::ProviderRequest { status, .. } if *status >= 400)
    }
}

impl From<std::io::Error> for MaildownError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::Error> for MaildownError {
    fn from(err: reqwest::Error) -> Self {
        Self::ProviderRequest {
            code: "HttpError".into(),
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
        }
    }
}

impl From<tera::Error> for MaildownError {
    fn from(err: tera::Error) -> Self {
        Self::Render(err.to_string())
    }
}

/// Result type alias for Maildown operations
pub type MaildownResult<T> = Result<T, MaildownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MaildownError::UnknownBackend("grrr".into());
        assert_eq!(err.to_string(), "No backend called grrr exists");
    }

    #[test]
    fn test_validation_errors() {
        assert!(MaildownError::AmbiguousContent.is_validation());
        assert!(MaildownError::NoRecipients.is_validation());
        assert!(!MaildownError::MissingCredentials.is_validation());
        assert!(!MaildownError::ThemeNotFound("x.css".into()).is_validation());
    }

    #[test]
    fn test_provider_error_display() {
        let err = MaildownError::ProviderRequest {
            code: "MessageRejected".into(),
            message: "Email address is not verified.".into(),
            status: 400,
        };
        assert_eq!(
            err.to_string(),
            "MessageRejected (400): Email address is not verified."
        );
        assert!(err.is_service_error());
        assert!(!MaildownError::http("connection refused").is_service_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MaildownError = io_err.into();
        assert!(matches!(err, MaildownError::Io(_)));
    }
}
