//! Session management and token endpoint models.

use serde::{Deserialize, Serialize};

/// A server-side banking session as returned by the session endpoints.
///
/// The server creates the session during the password grant; the client only
/// lists, validates and activates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier used in the session URLs
    pub identifier: String,
    /// Whether the session is unlocked by a TAN
    #[serde(default)]
    pub session_tan_active: bool,
    /// Whether second-factor authentication is activated for the session
    #[serde(default, rename = "activated2FA")]
    pub activated_2fa: bool,
}

impl Session {
    /// The request body used for validation and activation: the session
    /// marked as TAN-active with two-factor authentication enabled.
    pub(crate) fn tan_activation_request(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            session_tan_active: true,
            activated_2fa: true,
        }
    }
}

/// A TAN challenge handed out by session validation.
///
/// Decoded from the `x-once-authentication-info` response header. A
/// challenge is valid for exactly one validate/activate round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge id, echoed back when activating the session
    pub id: String,
    /// Challenge type, e.g. `P_TAN` (photoTAN) or `P_TAN_PUSH`
    #[serde(default)]
    pub typ: String,
    /// Inline challenge payload such as a base64-encoded photoTAN image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    /// TAN media the challenge was sent to
    #[serde(default, rename = "availableTypes", skip_serializing_if = "Vec::is_empty")]
    pub available_types: Vec<String>,
}

/// Response body of the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenGrant {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}
