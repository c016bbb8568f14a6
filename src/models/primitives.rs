//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around string identifiers
//! to prevent mixing up different types of IDs at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id for one logical banking session.
///
/// Chosen by the client before the password grant and kept for the whole
/// lifetime of the session, including every refresh.
///
/// # Example
///
/// ```
/// use comdirect_rs::SessionGuid;
///
/// let a = SessionGuid::generate();
/// let b = SessionGuid::generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionGuid(String);

impl SessionGuid {
    /// Create a session GUID from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh random (v4) session GUID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the GUID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionGuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionGuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Short numeric id sent in the request-info header for tracing.
///
/// Derived from the sub-second part of the creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a request id from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Derive a request id from the current time.
    pub fn generate() -> Self {
        Self::from_timestamp(Utc::now())
    }

    /// Derive a request id from a timestamp: the last three digits of its
    /// Unix millisecond value.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!("{:03}", at.timestamp_millis().rem_euclid(1000)))
    }

    /// Get the request id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strongly-typed account id.
///
/// # Example
///
/// ```
/// use comdirect_rs::AccountId;
///
/// let account = AccountId::new("C6F3B4A0E5D24B1B");
/// println!("Account: {}", account);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account id from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A strongly-typed depot id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepotId(String);

impl DepotId {
    /// Create a new depot id.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the depot id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DepotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A strongly-typed depot position id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(String);

impl PositionId {
    /// Create a new position id.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the position id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PositionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
