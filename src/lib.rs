//! # comdirect-rs
//!
//! An async Rust client for the comdirect banking REST API.
//!
//! The heart of the crate is the session lifecycle: a challenge/response
//! login confirmed by the customer through a TAN (photoTAN, push TAN),
//! tokens that are refreshed when they expire and guarded against
//! concurrent use, and an optional background task that refreshes tokens
//! before they run out. Read endpoints for accounts and depots are built
//! on top of that.
//!
//! ## Features
//!
//! - **Authentication**: six-step session negotiation with an async TAN
//!   confirmation callback and cooperative cancellation
//! - **Token lifecycle**: refresh on expiry, revocation, single-user locking,
//!   background refresh
//! - **Accounts**: balances and transactions, with eager and lazy pagination
//! - **Depots**: depots, positions and depot transactions
//! - **Async-first**: built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use comdirect_rs::{ComdirectClient, Credentials, RefresherConfig, TransactionState};
//!
//! #[tokio::main]
//! async fn main() -> comdirect_rs::Result<()> {
//!     let client = ComdirectClient::new(Credentials::from_env()?)?;
//!
//!     let token = client
//!         .authenticate(|challenge| async move {
//!             println!("Confirm challenge {} ({}) in your app", challenge.id, challenge.typ);
//!             tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!             Ok(())
//!         })
//!         .await?;
//!
//!     let refresher = client.spawn_auto_refresh(RefresherConfig::default());
//!
//!     let balances = client.accounts().balances(&token, false).await?;
//!     for balance in &balances.values {
//!         let transactions = client
//!             .accounts()
//!             .paginated_transactions(
//!                 &token,
//!                 &balance.account_id.as_str().into(),
//!                 TransactionState::Booked,
//!                 100,
//!                 None,
//!             )
//!             .await?;
//!         println!("{}: {} transactions", balance.account_id, transactions.values.len());
//!     }
//!
//!     refresher.shutdown().await;
//!     client.revoke_token(&token).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! A [`Token`] serves one request at a time. Issuing a second request with a
//! token that is in use fails immediately with [`Error::LockedToken`]; use
//! separate sessions for parallel work.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use api::{
    AccountsService, DepotTransactionsQuery, DepotsService, PositionOptions, TransactionOptions,
};
pub use auth::{BackgroundRefresher, RefresherConfig, Token, TokenRegistry, TokenSnapshot};
pub use client::{
    AuthenticatedResponse, ClientConfig, ComdirectClient, Credentials, Endpoints, PagedResult,
    Pager, RequestMonitor, SessionSelection, PAGE_SIZE,
};
pub use error::{Error, Result};
pub use models::{
    AccountId, BookingStatus, Challenge, DepotId, Paging, PositionId, RequestId, Session,
    SessionGuid, TransactionState,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use comdirect_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{DepotTransactionsQuery, PositionOptions, TransactionOptions};
    pub use crate::auth::{BackgroundRefresher, RefresherConfig, Token};
    pub use crate::client::{ClientConfig, ComdirectClient, Credentials, Endpoints, Pager};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountId, DepotId, PositionId, RequestId, SessionGuid,
        // Session
        Challenge, Session,
        // Accounts
        AccountBalance, AccountBalances, AccountTransaction, AccountTransactions,
        TransactionState,
        // Depots
        BookingStatus, Depot, DepotPosition, DepotPositions, DepotTransaction, DepotTransactions,
        Depots,
        // Common
        Amount, Paging,
    };
}
