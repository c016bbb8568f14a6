//! Registry of live tokens owned by a client.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::Token;
use crate::models::SessionGuid;

/// Tokens known to a [`ComdirectClient`](crate::ComdirectClient), keyed by
/// session GUID.
///
/// Negotiated tokens are added automatically and revoked tokens removed.
/// The background refresher works on [`snapshot`](Self::snapshot)s so it
/// never iterates the map while another task modifies it.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<SessionGuid, Token>>,
}

impl TokenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token, replacing any token registered for the same session.
    pub async fn insert(&self, token: Token) {
        self.tokens
            .write()
            .await
            .insert(token.session_guid().clone(), token);
    }

    /// Remove the token registered for a session.
    pub async fn remove(&self, session_guid: &SessionGuid) -> Option<Token> {
        self.tokens.write().await.remove(session_guid)
    }

    /// Remove `token` if it is still the one registered for its session.
    pub async fn remove_token(&self, token: &Token) -> bool {
        let mut tokens = self.tokens.write().await;
        match tokens.get(token.session_guid()) {
            Some(current) if current.same_token(token) => {
                tokens.remove(token.session_guid());
                true
            }
            _ => false,
        }
    }

    /// Whether `token` is the handle registered for its session.
    pub async fn contains(&self, token: &Token) -> bool {
        self.tokens
            .read()
            .await
            .get(token.session_guid())
            .is_some_and(|current| current.same_token(token))
    }

    /// Look up the token registered for a session.
    pub async fn get(&self, session_guid: &SessionGuid) -> Option<Token> {
        self.tokens.read().await.get(session_guid).cloned()
    }

    /// Clone handles to all registered tokens.
    pub async fn snapshot(&self) -> Vec<Token> {
        self.tokens.read().await.values().cloned().collect()
    }

    /// Number of registered tokens.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no token is registered.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}
