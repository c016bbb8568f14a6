//! API service modules for comdirect endpoints.
//!
//! Each service wraps a group of read endpoints. Every call takes the
//! [`Token`](crate::Token) to use and goes through the client's
//! authenticated request path.

mod accounts;
mod depots;

pub use accounts::{AccountsService, TransactionOptions};
pub use depots::{DepotTransactionsQuery, DepotsService, PositionOptions};
