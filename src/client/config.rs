//! Client configuration options.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::models::Session;
use crate::{Error, Result};

const DEFAULT_API_URL: &str = "https://api.comdirect.de/api";
const DEFAULT_TOKEN_URL: &str = "https://api.comdirect.de/oauth/token";
const DEFAULT_REVOKE_URL: &str = "https://api.comdirect.de/oauth/revoke";

/// Default ceiling for the per-second request monitor.
pub const DEFAULT_REQUEST_LIMIT_PER_SECOND: u32 = 10;

/// Configuration for the comdirect client.
///
/// # Example
///
/// ```
/// use comdirect_rs::{ClientConfig, SessionSelection};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0")
///     .with_session_selection(SessionSelection::Index(0));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Requests per wall-clock second above which a warning is logged.
    /// Requests are never delayed or dropped.
    pub request_limit_per_second: u32,
    /// Which server session to validate during authentication
    pub session_selection: SessionSelection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("comdirect-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            request_limit_per_second: DEFAULT_REQUEST_LIMIT_PER_SECOND,
            session_selection: SessionSelection::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-second request ceiling used for warnings.
    pub fn with_request_limit(mut self, per_second: u32) -> Self {
        self.request_limit_per_second = per_second;
        self
    }

    /// Choose which session to validate during authentication.
    pub fn with_session_selection(mut self, selection: SessionSelection) -> Self {
        self.session_selection = selection;
        self
    }
}

/// How the negotiator picks a session when the server lists several.
///
/// The API gives no criterion to tell sessions apart, so the choice is left
/// to the embedding application. The default takes the first session, which
/// is correct for accounts with a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionSelection {
    /// The first listed session
    #[default]
    First,
    /// The session at the given list position
    Index(usize),
    /// The session with the given identifier
    Identifier(String),
}

impl SessionSelection {
    /// Pick a session from the server's list.
    pub fn select<'a>(&self, sessions: &'a [Session]) -> Option<&'a Session> {
        match self {
            SessionSelection::First => sessions.first(),
            SessionSelection::Index(index) => sessions.get(*index),
            SessionSelection::Identifier(id) => sessions.iter().find(|s| &s.identifier == id),
        }
    }
}

/// Base URLs of the API and OAuth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL for REST resources
    pub api_url: Url,
    /// OAuth token endpoint (password, refresh and secondary grants)
    pub token_url: Url,
    /// OAuth revocation endpoint
    pub revoke_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::production()
    }
}

impl Endpoints {
    /// The public comdirect endpoints.
    pub fn production() -> Self {
        Self {
            api_url: DEFAULT_API_URL.parse().expect("valid default URL"),
            token_url: DEFAULT_TOKEN_URL.parse().expect("valid default URL"),
            revoke_url: DEFAULT_REVOKE_URL.parse().expect("valid default URL"),
        }
    }

    /// Derive all endpoints from one host, e.g. a mock server:
    /// `{base}/api`, `{base}/oauth/token` and `{base}/oauth/revoke`.
    ///
    /// # Example
    ///
    /// ```
    /// use comdirect_rs::Endpoints;
    ///
    /// let endpoints = Endpoints::from_base_url("http://127.0.0.1:8080").unwrap();
    /// assert_eq!(endpoints.token_url.as_str(), "http://127.0.0.1:8080/oauth/token");
    /// ```
    pub fn from_base_url(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        let root = base.as_str().trim_end_matches('/');
        Ok(Self {
            api_url: Url::parse(&format!("{}/api", root))?,
            token_url: Url::parse(&format!("{}/oauth/token", root))?,
            revoke_url: Url::parse(&format!("{}/oauth/revoke", root))?,
        })
    }

    /// Production endpoints, each overridable through `COMDIRECT_API_URL`,
    /// `COMDIRECT_TOKEN_URL` and `COMDIRECT_REVOKE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut endpoints = Self::production();
        if let Some(url) = lookup("COMDIRECT_API_URL") {
            endpoints.api_url = Url::parse(&url)?;
        }
        if let Some(url) = lookup("COMDIRECT_TOKEN_URL") {
            endpoints.token_url = Url::parse(&url)?;
        }
        if let Some(url) = lookup("COMDIRECT_REVOKE_URL") {
            endpoints.revoke_url = Url::parse(&url)?;
        }
        Ok(endpoints)
    }

    /// Full URL of a REST resource below the API base.
    pub(crate) fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url.as_str().trim_end_matches('/'), path)
    }
}

/// Login credentials: OAuth client plus the customer's access number and PIN.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Customer access number (Zugangsnummer), the password-grant username
    pub access_number: String,
    /// Online banking PIN, the password-grant password
    pub pin: SecretString,
}

impl Credentials {
    /// Create credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_number: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            access_number: access_number.into(),
            pin: SecretString::from(pin.into()),
        }
    }

    /// Read credentials from `COMDIRECT_CLIENT_ID`, `COMDIRECT_CLIENT_SECRET`,
    /// `COMDIRECT_ACCESS_NUMBER` and `COMDIRECT_PIN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Config(format!("{} must be set", key)))
        };

        Ok(Self::new(
            require("COMDIRECT_CLIENT_ID")?,
            require("COMDIRECT_CLIENT_SECRET")?,
            require("COMDIRECT_ACCESS_NUMBER")?,
            require("COMDIRECT_PIN")?,
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("access_number", &self.access_number)
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn session(id: &str) -> Session {
        Session {
            identifier: id.to_string(),
            session_tan_active: false,
            activated_2fa: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.request_limit_per_second, 10);
        assert_eq!(config.session_selection, SessionSelection::First);
    }

    #[test]
    fn test_session_selection() {
        let sessions = vec![session("a"), session("b")];
        assert_eq!(SessionSelection::First.select(&sessions).unwrap().identifier, "a");
        assert_eq!(SessionSelection::Index(1).select(&sessions).unwrap().identifier, "b");
        assert!(SessionSelection::Index(2).select(&sessions).is_none());
        assert_eq!(
            SessionSelection::Identifier("b".into())
                .select(&sessions)
                .unwrap()
                .identifier,
            "b"
        );
        assert!(SessionSelection::First.select(&[]).is_none());
    }

    #[test]
    fn test_endpoints_from_base_url() {
        let endpoints = Endpoints::from_base_url("http://localhost:1234/").unwrap();
        assert_eq!(endpoints.api_url.as_str(), "http://localhost:1234/api");
        assert_eq!(endpoints.revoke_url.as_str(), "http://localhost:1234/oauth/revoke");
        assert_eq!(
            endpoints.api("/session/clients/user/v1/sessions"),
            "http://localhost:1234/api/session/clients/user/v1/sessions"
        );
        assert!(Endpoints::from_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoints_env_overrides() {
        let vars: HashMap<&str, &str> =
            [("COMDIRECT_TOKEN_URL", "http://mock/oauth/token")].into_iter().collect();
        let endpoints = Endpoints::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(endpoints.token_url.as_str(), "http://mock/oauth/token");
        assert_eq!(endpoints.api_url.as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let mut vars: HashMap<&str, &str> = [
            ("COMDIRECT_CLIENT_ID", "User_ABC"),
            ("COMDIRECT_CLIENT_SECRET", "s3cr3t-value"),
            ("COMDIRECT_ACCESS_NUMBER", "12345678"),
            ("COMDIRECT_PIN", "9999"),
        ]
        .into_iter()
        .collect();

        let creds = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.access_number, "12345678");
        let debug_str = format!("{:?}", creds);
        assert!(!debug_str.contains("9999"));
        assert!(!debug_str.contains("s3cr3t-value"));

        vars.remove("COMDIRECT_PIN");
        let err = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("COMDIRECT_PIN")));
    }
}
