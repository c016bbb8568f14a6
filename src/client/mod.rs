//! HTTP client and service layer for the comdirect API.
//!
//! This module provides the main entry point [`ComdirectClient`] for
//! interacting with the comdirect API.
//!
//! # Example
//!
//! ```no_run
//! use comdirect_rs::{ClientConfig, ComdirectClient, Credentials, Endpoints};
//!
//! # async fn example() -> comdirect_rs::Result<()> {
//! let client = ComdirectClient::with_config(
//!     Credentials::from_env()?,
//!     Endpoints::from_env()?,
//!     ClientConfig::default(),
//! )?;
//!
//! let token = client.authenticate(|_challenge| async { Ok(()) }).await?;
//! let depots = client.depots().list(&token).await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub(crate) mod http;
pub mod paginated;
mod rate_limit;

pub use config::{
    ClientConfig, Credentials, Endpoints, SessionSelection, DEFAULT_REQUEST_LIMIT_PER_SECOND,
};
pub use http::{AuthenticatedResponse, ComdirectClient};
pub use paginated::{PagedResult, PaginatedStream, Pager, PAGE_SIZE};
pub use rate_limit::RequestMonitor;
pub(crate) use http::ClientInner;
