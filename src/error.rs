//! Error types for the comdirect API client.
//!
//! Every failure in the authentication handshake has its own variant so a
//! caller can tell which step failed without matching on strings.

use thiserror::Error;

/// A specialized `Result` type for comdirect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all comdirect API operations.
///
/// Nothing in this crate retries on its own. [`Error::LockedToken`] is the
/// only condition that is expected to go away if the caller simply tries
/// again later.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The password grant was rejected or returned an unusable token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The user has no session the client could select
    #[error("No session found")]
    NoSessionFound,

    /// Session validation did not hand out a usable TAN challenge
    #[error("Missing TAN challenge: {0}")]
    MissingChallenge(String),

    /// The second-factor confirmation callback reported a failure
    #[error("Two-factor confirmation failed: {0}")]
    TwoFactorFailed(String),

    /// The server did not report the session as TAN-active after activation
    #[error("Session was not activated")]
    SessionNotActivated,

    /// The token is in use by another request; retry later
    #[error("Token is locked by an in-flight request")]
    LockedToken,

    /// The refresh-token grant failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// An API call returned a status code other than the expected one
    #[error("Request failed with status code {status}")]
    RequestFailed {
        /// HTTP status code returned by the server
        status: u16,
    },

    /// The token was revoked and must not be used again
    #[error("Token has been revoked")]
    TokenRevoked,

    /// The operation observed a cancellation signal between steps
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the operation may succeed when simply retried.
    ///
    /// # Example
    ///
    /// ```
    /// use comdirect_rs::Error;
    ///
    /// assert!(Error::LockedToken.is_retryable());
    /// assert!(!Error::NoSessionFound.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockedToken)
    }

    /// Returns `true` if this error came out of the authentication handshake
    /// or token lifecycle.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed(_)
                | Error::NoSessionFound
                | Error::MissingChallenge(_)
                | Error::TwoFactorFailed(_)
                | Error::SessionNotActivated
                | Error::RefreshFailed(_)
                | Error::TokenRevoked
        )
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this error indicates a client-side issue.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::RequestFailed { status } => (400..500).contains(status),
            Error::InvalidInput(_) | Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::RequestFailed { status } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_locked_token_is_retryable() {
        assert!(Error::LockedToken.is_retryable());
        assert!(!Error::RequestFailed { status: 503 }.is_retryable());
        assert!(!Error::RefreshFailed("expired".into()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_auth() {
        assert!(Error::NoSessionFound.is_auth_error());
        assert!(Error::MissingChallenge("no header".into()).is_auth_error());
        assert!(Error::SessionNotActivated.is_auth_error());
        assert!(!Error::LockedToken.is_auth_error());
        assert!(!Error::RequestFailed { status: 401 }.is_auth_error());
    }

    #[test]
    fn test_status_classification() {
        let err = Error::RequestFailed { status: 404 };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::RequestFailed { status: 502 };
        assert!(err.is_server_error());
        assert!(!err.is_client_error());

        assert_eq!(Error::SessionNotActivated.status(), None);
    }

    #[test]
    fn test_display_names_the_failed_step() {
        assert_eq!(
            Error::RequestFailed { status: 422 }.to_string(),
            "Request failed with status code 422"
        );
        assert!(Error::MissingChallenge("header absent".into())
            .to_string()
            .contains("header absent"));
    }
}
