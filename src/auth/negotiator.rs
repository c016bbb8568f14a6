//! Challenge/response handshake that turns login credentials into a
//! TAN-confirmed session token.

use std::future::Future;

use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;

use super::Token;
use crate::client::http::{read_grant, ClientInner};
use crate::models::{Challenge, RequestId, Session, SessionGuid};
use crate::{Error, Result};

const SESSIONS_PATH: &str = "/session/clients/user/v1/sessions";

/// Response header carrying the TAN challenge; echoed on activation.
const X_ONCE_AUTHENTICATION_INFO: &str = "x-once-authentication-info";
/// Header carrying the one-time code on activation.
const X_ONCE_AUTHENTICATION: &str = "x-once-authentication";
/// Placeholder one-time code. The TAN is confirmed out of band, but the
/// header must be present.
const ONE_TIME_CODE_PLACEHOLDER: &str = "000000";

/// Drives one authentication attempt.
///
/// The steps run strictly in order and none is retried:
///
/// 1. password grant for an initial, limited token
/// 2. list the user's sessions and pick one
/// 3. validate the session, which issues a TAN challenge
/// 4. wait for the caller's confirmation callback
/// 5. activate the session with the confirmed challenge
/// 6. exchange the initial token for a fully scoped secondary token
///
/// Any failure aborts the attempt; nothing is kept for a later retry.
pub(crate) struct SessionNegotiator<'a> {
    inner: &'a ClientInner,
}

impl<'a> SessionNegotiator<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    pub(crate) async fn run<F, Fut>(&self, confirm: F, cancel: &CancellationToken) -> Result<Token>
    where
        F: FnOnce(Challenge) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        checkpoint(cancel)?;
        let initial = self.initial_token().await?;

        checkpoint(cancel)?;
        let sessions = self.sessions(&initial).await?;
        let session = self
            .inner
            .config
            .session_selection
            .select(&sessions)
            .ok_or(Error::NoSessionFound)?;
        if sessions.len() > 1 {
            tracing::warn!(
                count = sessions.len(),
                selected = %session.identifier,
                "Multiple sessions found"
            );
        }

        checkpoint(cancel)?;
        let challenge = self.validate_session(&initial, &session.identifier).await?;

        checkpoint(cancel)?;
        tracing::debug!(
            challenge_id = %challenge.id,
            challenge_type = %challenge.typ,
            "Waiting for TAN confirmation"
        );
        let challenge_id = challenge.id.clone();
        confirm(challenge).await?;

        checkpoint(cancel)?;
        self.activate_session(&initial, &session.identifier, &challenge_id)
            .await?;

        checkpoint(cancel)?;
        let token = self.secondary_token(&initial).await?;
        self.inner.registry.insert(token.clone()).await;

        tracing::debug!(session = %token.session_guid(), "Authentication complete");
        Ok(token)
    }

    async fn initial_token(&self) -> Result<Token> {
        tracing::debug!("Requesting initial token");

        let session_guid = SessionGuid::generate();
        let request_id = RequestId::generate();
        let credentials = &self.inner.credentials;

        let issued_at = Utc::now();
        let response = self
            .inner
            .token_request(
                &[
                    ("grant_type", "password"),
                    ("username", credentials.access_number.as_str()),
                    ("password", credentials.pin.expose_secret()),
                ],
                Some(&session_guid),
            )
            .await?;
        let grant = read_grant(response, Error::AuthenticationFailed).await?;

        Ok(Token::from_grant(grant, issued_at, session_guid, request_id))
    }

    async fn sessions(&self, token: &Token) -> Result<Vec<Session>> {
        tracing::debug!("Listing sessions");

        let request = self
            .inner
            .http
            .get(self.inner.endpoints.api(SESSIONS_PATH))
            .header(COOKIE, format!("qSession={}", token.session_guid()));

        self.inner
            .authenticated_request(request, token, StatusCode::OK)
            .await?
            .json()
    }

    async fn validate_session(&self, token: &Token, identifier: &str) -> Result<Challenge> {
        tracing::debug!(session_id = %identifier, "Validating session");

        let request = self
            .inner
            .http
            .post(
                self.inner
                    .endpoints
                    .api(&format!("{}/{}/validate", SESSIONS_PATH, identifier)),
            )
            .json(&Session::tan_activation_request(identifier));

        let response = self
            .inner
            .authenticated_request(request, token, StatusCode::CREATED)
            .await?;

        let session: Session = response.json()?;
        if !session.session_tan_active {
            return Err(Error::SessionNotActivated);
        }

        let header = response.header(X_ONCE_AUTHENTICATION_INFO).ok_or_else(|| {
            Error::MissingChallenge(format!("response has no {} header", X_ONCE_AUTHENTICATION_INFO))
        })?;
        let challenge: Challenge = serde_json::from_str(header).map_err(|e| {
            Error::MissingChallenge(format!("undecodable {} header: {}", X_ONCE_AUTHENTICATION_INFO, e))
        })?;
        if challenge.id.is_empty() {
            return Err(Error::MissingChallenge("empty challenge id".to_string()));
        }

        Ok(challenge)
    }

    async fn activate_session(
        &self,
        token: &Token,
        identifier: &str,
        challenge_id: &str,
    ) -> Result<Session> {
        tracing::debug!(session_id = %identifier, "Activating session");

        let request = self
            .inner
            .http
            .patch(
                self.inner
                    .endpoints
                    .api(&format!("{}/{}", SESSIONS_PATH, identifier)),
            )
            .header(
                X_ONCE_AUTHENTICATION_INFO,
                serde_json::json!({ "id": challenge_id }).to_string(),
            )
            .header(X_ONCE_AUTHENTICATION, ONE_TIME_CODE_PLACEHOLDER)
            .json(&Session::tan_activation_request(identifier));

        let session: Session = self
            .inner
            .authenticated_request(request, token, StatusCode::OK)
            .await?
            .json()?;

        if !session.session_tan_active {
            return Err(Error::SessionNotActivated);
        }
        Ok(session)
    }

    async fn secondary_token(&self, initial: &Token) -> Result<Token> {
        tracing::debug!("Requesting secondary token");

        let access_token = initial.access_token().await;
        let issued_at = Utc::now();
        let response = self
            .inner
            .token_request(
                &[
                    ("grant_type", "cd_secondary"),
                    ("token", access_token.expose_secret()),
                ],
                None,
            )
            .await?;
        let grant = read_grant(response, Error::AuthenticationFailed).await?;

        Ok(Token::from_grant(
            grant,
            issued_at,
            initial.session_guid().clone(),
            initial.request_id().clone(),
        ))
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint() {
        let cancel = CancellationToken::new();
        assert!(checkpoint(&cancel).is_ok());
        cancel.cancel();
        assert!(matches!(checkpoint(&cancel), Err(Error::Cancelled)));
    }
}
