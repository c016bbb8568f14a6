//! Data models for the comdirect API.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - Identifier newtypes like `SessionGuid`, `AccountId`
//! - [`session`] - Sessions and TAN challenges used during authentication
//! - [`common`] - Amounts, prices and paging descriptors
//! - [`account`] - Account balances and transactions
//! - [`depot`] - Depots, positions and depot transactions

pub mod primitives;
pub mod session;
pub mod common;
pub mod account;
pub mod depot;

// Re-export commonly used types
pub use primitives::*;
pub use session::{Challenge, Session};
pub(crate) use session::TokenGrant;
pub use common::*;
pub use account::*;
pub use depot::*;
