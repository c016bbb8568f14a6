//! Authentication and token lifecycle for the comdirect API.
//!
//! A session is established with a challenge/response handshake: an
//! initial password grant, validation of a server session which issues a
//! TAN challenge, out-of-band confirmation by the customer, activation of
//! the session and finally a secondary grant for the fully scoped token.
//!
//! ```no_run
//! use comdirect_rs::{ComdirectClient, Credentials};
//!
//! # async fn example() -> comdirect_rs::Result<()> {
//! let client = ComdirectClient::new(Credentials::from_env()?)?;
//!
//! let token = client
//!     .authenticate(|challenge| async move {
//!         println!("Please confirm challenge {} in your app", challenge.id);
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Token lifecycle
//!
//! A [`Token`] is a shared handle. Only one request may use it at a time;
//! a concurrent caller gets [`Error::LockedToken`](crate::Error::LockedToken)
//! instead of waiting. Expired tokens are refreshed before use, and a
//! [`BackgroundRefresher`] can refresh registered tokens ahead of expiry:
//!
//! ```no_run
//! use comdirect_rs::{ComdirectClient, RefresherConfig};
//!
//! # async fn example(client: ComdirectClient) {
//! let refresher = client.spawn_auto_refresh(RefresherConfig::default());
//! // ...
//! refresher.shutdown().await;
//! # }
//! ```

mod negotiator;
mod refresher;
mod registry;
mod token;

pub(crate) use negotiator::SessionNegotiator;
pub use refresher::{BackgroundRefresher, RefresherConfig};
pub use registry::TokenRegistry;
pub use token::{BusyGuard, Token, TokenSnapshot};
