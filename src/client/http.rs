//! HTTP client implementation and the authenticated request path.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::{AccountsService, DepotsService};
use crate::auth::{
    BackgroundRefresher, RefresherConfig, SessionNegotiator, Token, TokenRegistry,
};
use crate::models::{Challenge, SessionGuid, TokenGrant};
use crate::{Error, Result};

use super::config::{ClientConfig, Credentials, Endpoints};
use super::rate_limit::RequestMonitor;

/// Header carrying the session and request correlation ids.
pub(crate) const X_HTTP_REQUEST_INFO: &str = "x-http-request-info";

/// The main client for interacting with the comdirect API.
///
/// Tokens are owned by the caller and passed to every call. The client keeps
/// a [`TokenRegistry`] of the tokens it negotiated so the
/// [`BackgroundRefresher`] can keep them alive.
///
/// # Example
///
/// ```no_run
/// use comdirect_rs::{ComdirectClient, Credentials};
///
/// # async fn example() -> comdirect_rs::Result<()> {
/// let client = ComdirectClient::new(Credentials::from_env()?)?;
///
/// let token = client
///     .authenticate(|challenge| async move {
///         println!("Confirm TAN challenge {} ({})", challenge.id, challenge.typ);
///         Ok(())
///     })
///     .await?;
///
/// let balances = client.accounts().balances(&token, false).await?;
/// println!("{} accounts", balances.values.len());
///
/// client.revoke_token(&token).await?;
/// # Ok(())
/// # }
/// ```
pub struct ComdirectClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) endpoints: Endpoints,
    pub(crate) credentials: Credentials,
    pub(crate) config: ClientConfig,
    pub(crate) registry: TokenRegistry,
    pub(crate) monitor: RequestMonitor,
}

impl ComdirectClient {
    /// Create a client for the production endpoints with default settings.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, Endpoints::production(), ClientConfig::default())
    }

    /// Create a client from `COMDIRECT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(
            Credentials::from_env()?,
            Endpoints::from_env()?,
            ClientConfig::default(),
        )
    }

    /// Create a client with explicit endpoints and configuration.
    pub fn with_config(
        credentials: Credentials,
        endpoints: Endpoints,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                monitor: RequestMonitor::new(config.request_limit_per_second),
                registry: TokenRegistry::new(),
                endpoints,
                credentials,
                config,
            }),
        })
    }

    /// Run the full authentication handshake and return a session token.
    ///
    /// `confirm` is called once with the TAN challenge and must resolve when
    /// the customer has confirmed it out of band (photoTAN app, push TAN).
    /// No timeout is applied; wrap the future yourself if you need one.
    ///
    /// The returned token is added to the client's [`TokenRegistry`].
    ///
    /// # Errors
    ///
    /// Each step has its own error kind: [`Error::AuthenticationFailed`],
    /// [`Error::NoSessionFound`], [`Error::MissingChallenge`],
    /// [`Error::SessionNotActivated`], [`Error::RequestFailed`] or whatever
    /// `confirm` returns. A failed handshake must be restarted from scratch.
    pub async fn authenticate<F, Fut>(&self, confirm: F) -> Result<Token>
    where
        F: FnOnce(Challenge) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.authenticate_with_cancel(confirm, &CancellationToken::new())
            .await
    }

    /// Like [`authenticate`](Self::authenticate), checking `cancel` between
    /// steps. A cancelled handshake fails with [`Error::Cancelled`].
    pub async fn authenticate_with_cancel<F, Fut>(
        &self,
        confirm: F,
        cancel: &CancellationToken,
    ) -> Result<Token>
    where
        F: FnOnce(Challenge) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        SessionNegotiator::new(&self.inner).run(confirm, cancel).await
    }

    /// Perform an authenticated call.
    ///
    /// This is the single path every business call goes through. The token
    /// is refreshed first if it has expired, then marked busy for the
    /// duration of the request. The bearer credential and correlation
    /// headers are attached here; `request` must carry everything else.
    ///
    /// # Errors
    ///
    /// - [`Error::TokenRevoked`] if the token was revoked
    /// - [`Error::LockedToken`] if another request is using the token; no
    ///   request is sent
    /// - [`Error::RequestFailed`] if the response status differs from
    ///   `expected_status`
    /// - refresh errors and transport errors unchanged
    pub async fn authenticated_request(
        &self,
        request: RequestBuilder,
        token: &Token,
        expected_status: StatusCode,
    ) -> Result<AuthenticatedResponse> {
        self.inner
            .authenticated_request(request, token, expected_status)
            .await
    }

    /// Start a request against a path below the API base URL, to be passed
    /// to [`authenticated_request`](Self::authenticated_request).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.http.request(method, self.inner.endpoints.api(path))
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Credentials are replaced in place, so every clone of `token` sees
    /// the new access token. Session GUID and request id are kept.
    pub async fn refresh_token(&self, token: &Token) -> Result<()> {
        self.inner.refresh_token(token).await
    }

    /// Revoke the token on the server. It must not be used afterwards.
    pub async fn revoke_token(&self, token: &Token) -> Result<()> {
        self.inner.revoke_token(token).await
    }

    /// Add an externally obtained token (e.g. restored from a cache) to the
    /// registry so the background refresher keeps it alive.
    pub async fn register_token(&self, token: Token) {
        self.inner.registry.insert(token).await;
    }

    /// Start a [`BackgroundRefresher`] for the tokens in the registry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_auto_refresh(&self, config: RefresherConfig) -> BackgroundRefresher {
        self.spawn_auto_refresh_with_cancel(config, CancellationToken::new())
    }

    /// Start a [`BackgroundRefresher`] that also stops when `cancel` fires.
    pub fn spawn_auto_refresh_with_cancel(
        &self,
        config: RefresherConfig,
        cancel: CancellationToken,
    ) -> BackgroundRefresher {
        BackgroundRefresher::spawn(self.inner.clone(), config, cancel)
    }

    /// Get the accounts service.
    pub fn accounts(&self) -> AccountsService {
        AccountsService::new(self.inner.clone())
    }

    /// Get the depots service.
    pub fn depots(&self) -> DepotsService {
        DepotsService::new(self.inner.clone())
    }

    /// The tokens this client knows about.
    pub fn tokens(&self) -> &TokenRegistry {
        &self.inner.registry
    }

    /// The outbound request monitor.
    pub fn request_monitor(&self) -> &RequestMonitor {
        &self.inner.monitor
    }

    /// The configured endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }
}

impl ClientInner {
    pub(crate) async fn authenticated_request(
        &self,
        request: RequestBuilder,
        token: &Token,
        expected_status: StatusCode,
    ) -> Result<AuthenticatedResponse> {
        if token.is_revoked() {
            return Err(Error::TokenRevoked);
        }

        if token.is_expired().await {
            tracing::debug!(session = %token.session_guid(), "Token expired, refreshing");
            self.refresh_token(token).await?;
        }

        let _busy = token.try_acquire()?;

        let mut request = request.build()?;
        let access_token = token.access_token().await;
        let headers = request.headers_mut();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token.expose_secret()))
                .map_err(|_| Error::InvalidInput("Invalid token format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static(X_HTTP_REQUEST_INFO),
            HeaderValue::from_str(&token.request_info())
                .map_err(|_| Error::InvalidInput("Invalid request info".to_string()))?,
        );
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        self.monitor.record();
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            session = %token.session_guid(),
            "Sending authenticated request"
        );

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if status != expected_status {
            log_error_body(status, &body);
            return Err(Error::RequestFailed {
                status: status.as_u16(),
            });
        }

        Ok(AuthenticatedResponse {
            status,
            headers,
            body,
        })
    }

    /// GET a resource below the API base and decode the JSON body.
    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q, token: &Token) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.http.get(self.endpoints.api(path)).query(query);
        self.authenticated_request(request, token, StatusCode::OK)
            .await?
            .json()
    }

    pub(crate) async fn refresh_token(&self, token: &Token) -> Result<()> {
        if token.is_revoked() {
            return Err(Error::TokenRevoked);
        }

        let _busy = token.try_acquire()?;
        tracing::debug!(session = %token.session_guid(), "Refreshing token");

        let refresh_token = token.refresh_token().await;
        let issued_at = Utc::now();
        let response = self
            .token_request(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.expose_secret()),
                ],
                None,
            )
            .await?;
        let grant = read_grant(response, Error::RefreshFailed).await?;

        token.replace(grant, issued_at).await;
        Ok(())
    }

    pub(crate) async fn revoke_token(&self, token: &Token) -> Result<()> {
        tracing::debug!(session = %token.session_guid(), "Revoking token");

        let request = self.http.delete(self.endpoints.revoke_url.clone());
        self.authenticated_request(request, token, StatusCode::NO_CONTENT)
            .await?;

        token.mark_revoked();
        self.registry.remove(token.session_guid()).await;
        Ok(())
    }

    /// POST a form to the token endpoint with the client credentials added.
    pub(crate) async fn token_request(
        &self,
        params: &[(&str, &str)],
        session: Option<&SessionGuid>,
    ) -> Result<reqwest::Response> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
        ];
        form.extend_from_slice(params);

        let mut request = self
            .http
            .post(self.endpoints.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&form);
        if let Some(session) = session {
            request = request.header(COOKIE, format!("qSession={}", session));
        }

        self.monitor.record();
        Ok(request.send().await?)
    }
}

/// Check and decode a token endpoint response, mapping every failure with
/// `fail`.
pub(crate) async fn read_grant(
    response: reqwest::Response,
    fail: fn(String) -> Error,
) -> Result<TokenGrant> {
    let status = response.status();
    let body = response.bytes().await?;

    if status != StatusCode::OK {
        log_error_body(status, &body);
        return Err(fail(format!(
            "token endpoint returned status code {}",
            status.as_u16()
        )));
    }

    let grant: TokenGrant = serde_json::from_slice(&body)
        .map_err(|e| fail(format!("undecodable token response: {}", e)))?;
    if grant.access_token.is_empty() {
        return Err(fail("missing access token in response".to_string()));
    }
    Ok(grant)
}

fn log_error_body(status: StatusCode, body: &[u8]) {
    if !body.is_empty() {
        tracing::debug!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(body),
            "Unexpected response"
        );
    }
}

/// Response of an authenticated call: status, headers and the fully read
/// body.
#[derive(Debug, Clone)]
pub struct AuthenticatedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AuthenticatedResponse {
    /// Response status; always the expected status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A response header as a string, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response, returning the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl Clone for ComdirectClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for ComdirectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComdirectClient")
            .field("endpoints", &self.inner.endpoints)
            .field("config", &self.inner.config)
            .finish()
    }
}
