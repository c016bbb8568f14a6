//! Access/refresh token pair bound to a banking session.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::{RequestId, SessionGuid, TokenGrant};
use crate::{Error, Result};

/// Authentication token for the comdirect API.
///
/// A `Token` is a cheap handle: clones share the same credentials, so a
/// refresh performed through one clone (by a business call or by the
/// [`BackgroundRefresher`](crate::auth::BackgroundRefresher)) is visible
/// through all of them.
///
/// # Thread Safety
///
/// Only one request may use a token at a time. The token carries an atomic
/// busy flag; a second concurrent request, refresh or revocation fails
/// immediately with [`Error::LockedToken`] instead of waiting.
#[derive(Clone)]
pub struct Token {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    session_guid: SessionGuid,
    request_id: RequestId,
    state: RwLock<TokenState>,
    busy: AtomicBool,
    revoked: AtomicBool,
}

struct TokenState {
    access_token: SecretString,
    refresh_token: SecretString,
    expires_in: i64,
    issued_at: DateTime<Utc>,
    scope: Option<String>,
}

impl Token {
    /// Create a token issued now.
    ///
    /// Normally tokens come out of
    /// [`ComdirectClient::authenticate`](crate::ComdirectClient::authenticate);
    /// this constructor exists for tokens obtained elsewhere.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: i64,
        session_guid: SessionGuid,
        request_id: RequestId,
    ) -> Self {
        Self::from_state(
            session_guid,
            request_id,
            TokenState {
                access_token: SecretString::from(access_token.into()),
                refresh_token: SecretString::from(refresh_token.into()),
                expires_in,
                issued_at: Utc::now(),
                scope: None,
            },
        )
    }

    pub(crate) fn from_grant(
        grant: TokenGrant,
        issued_at: DateTime<Utc>,
        session_guid: SessionGuid,
        request_id: RequestId,
    ) -> Self {
        Self::from_state(
            session_guid,
            request_id,
            TokenState {
                access_token: SecretString::from(grant.access_token),
                refresh_token: SecretString::from(grant.refresh_token),
                expires_in: grant.expires_in,
                issued_at,
                scope: grant.scope,
            },
        )
    }

    /// Restore a token from a snapshot taken with [`Token::snapshot`].
    pub fn from_snapshot(snapshot: TokenSnapshot) -> Self {
        Self::from_state(
            snapshot.session_guid,
            snapshot.request_id,
            TokenState {
                access_token: SecretString::from(snapshot.access_token),
                refresh_token: SecretString::from(snapshot.refresh_token),
                expires_in: snapshot.expires_in,
                issued_at: snapshot.issued_at,
                scope: snapshot.scope,
            },
        )
    }

    fn from_state(session_guid: SessionGuid, request_id: RequestId, state: TokenState) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                session_guid,
                request_id,
                state: RwLock::new(state),
                busy: AtomicBool::new(false),
                revoked: AtomicBool::new(false),
            }),
        }
    }

    /// The session correlation id. Stable across refreshes.
    pub fn session_guid(&self) -> &SessionGuid {
        &self.inner.session_guid
    }

    /// The request id used in the request-info header.
    pub fn request_id(&self) -> &RequestId {
        &self.inner.request_id
    }

    pub(crate) async fn access_token(&self) -> SecretString {
        self.inner.state.read().await.access_token.clone()
    }

    pub(crate) async fn refresh_token(&self) -> SecretString {
        self.inner.state.read().await.refresh_token.clone()
    }

    /// When the current access token was issued.
    pub async fn issued_at(&self) -> DateTime<Utc> {
        self.inner.state.read().await.issued_at
    }

    /// Lifetime of the current access token in seconds, as announced by the
    /// server.
    pub async fn expires_in(&self) -> i64 {
        self.inner.state.read().await.expires_in
    }

    /// When the current access token expires.
    pub async fn expires_at(&self) -> DateTime<Utc> {
        let state = self.inner.state.read().await;
        state.issued_at + Duration::seconds(state.expires_in)
    }

    /// Scope granted with the current access token.
    pub async fn scope(&self) -> Option<String> {
        self.inner.state.read().await.scope.clone()
    }

    /// Check if more time than the announced lifetime has passed since the
    /// token was issued.
    pub async fn is_expired(&self) -> bool {
        let state = self.inner.state.read().await;
        Utc::now() - state.issued_at > Duration::seconds(state.expires_in)
    }

    /// Check if the token will expire within the given period.
    pub async fn will_expire_in(&self, threshold: std::time::Duration) -> bool {
        let expires_at = self.expires_at().await;
        Duration::from_std(threshold)
            .ok()
            .and_then(|threshold| Utc::now().checked_add_signed(threshold))
            .map_or(true, |deadline| deadline >= expires_at)
    }

    /// Whether a request is currently using this token.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Mark the token busy for the lifetime of the returned guard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockedToken`] if the token is already busy.
    pub fn try_acquire(&self) -> Result<BusyGuard<'_>> {
        self.inner
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| BusyGuard {
                flag: &self.inner.busy,
            })
            .map_err(|_| Error::LockedToken)
    }

    /// Whether the token has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.inner.revoked.load(Ordering::Acquire)
    }

    pub(crate) fn mark_revoked(&self) {
        self.inner.revoked.store(true, Ordering::Release);
    }

    /// Swap in freshly granted credentials. Session GUID and request id stay.
    pub(crate) async fn replace(&self, grant: TokenGrant, issued_at: DateTime<Utc>) {
        let mut state = self.inner.state.write().await;
        state.access_token = SecretString::from(grant.access_token);
        state.refresh_token = SecretString::from(grant.refresh_token);
        state.expires_in = grant.expires_in;
        state.issued_at = issued_at;
        state.scope = grant.scope;
    }

    /// Value of the `x-http-request-info` header for this token.
    pub(crate) fn request_info(&self) -> String {
        serde_json::json!({
            "clientRequestId": {
                "sessionId": self.inner.session_guid.as_str(),
                "requestId": self.inner.request_id.as_str(),
            }
        })
        .to_string()
    }

    /// Returns `true` if both handles refer to the same token.
    pub fn same_token(&self, other: &Token) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Take a serializable copy of the token, e.g. to cache it between
    /// process runs.
    ///
    /// The snapshot contains the secrets in plain text; protecting it at
    /// rest is up to the caller.
    pub async fn snapshot(&self) -> TokenSnapshot {
        let state = self.inner.state.read().await;
        TokenSnapshot {
            access_token: state.access_token.expose_secret().to_string(),
            refresh_token: state.refresh_token.expose_secret().to_string(),
            expires_in: state.expires_in,
            issued_at: state.issued_at,
            scope: state.scope.clone(),
            session_guid: self.inner.session_guid.clone(),
            request_id: self.inner.request_id.clone(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("session_guid", &self.inner.session_guid)
            .field("request_id", &self.inner.request_id)
            .field("access_token", &"[REDACTED]")
            .field("busy", &self.is_busy())
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

/// Marks a [`Token`] busy until dropped.
#[must_use = "the token is released as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl fmt::Debug for BusyGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusyGuard").finish()
    }
}

/// Serializable copy of a [`Token`].
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Issue time of the access token
    pub issued_at: DateTime<Utc>,
    /// Granted scope
    #[serde(default)]
    pub scope: Option<String>,
    /// Session correlation id
    pub session_guid: SessionGuid,
    /// Request id
    pub request_id: RequestId,
}

impl fmt::Debug for TokenSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSnapshot")
            .field("session_guid", &self.session_guid)
            .field("issued_at", &self.issued_at)
            .field("expires_in", &self.expires_in)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
