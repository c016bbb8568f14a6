//! Depots service for securities accounts, positions and depot transactions.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::accounts::NO_QUERY;
use crate::auth::Token;
use crate::client::ClientInner;
use crate::models::{
    BookingStatus, DepotId, DepotPosition, DepotPositions, DepotTransactions, Depots, PositionId,
};
use crate::Result;

/// Service for depot-related operations.
///
/// # Example
///
/// ```no_run
/// use comdirect_rs::{DepotId, PositionOptions};
///
/// # async fn example(client: comdirect_rs::ComdirectClient, token: comdirect_rs::Token) -> comdirect_rs::Result<()> {
/// let depots = client.depots().list(&token).await?;
/// for depot in &depots.values {
///     let positions = client
///         .depots()
///         .positions(&token, &DepotId::new(&depot.depot_id), Some(PositionOptions {
///             include_instrument: true,
///             exclude_depot: true,
///         }))
///         .await?;
///     println!("{}: {} positions", depot.depot_id, positions.values.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DepotsService {
    inner: Arc<ClientInner>,
}

/// Options for listing depot positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionOptions {
    /// Embed instrument master data in each position
    pub include_instrument: bool,
    /// Leave out the depot object
    pub exclude_depot: bool,
}

#[derive(Debug, Serialize)]
struct PositionsQuery {
    #[serde(rename = "with-attr", skip_serializing_if = "Option::is_none")]
    with_attr: Option<&'static str>,
    #[serde(rename = "without-attr", skip_serializing_if = "Option::is_none")]
    without_attr: Option<&'static str>,
}

/// Filters for depot transactions. Unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotTransactionsQuery {
    /// German securities identification number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkn: Option<String>,
    /// International securities identification number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    /// Instrument UUID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_id: Option<String>,
    /// Booking status filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<BookingStatus>,
    /// Latest booking date, sent as `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_booking_date: Option<NaiveDate>,
}

impl DepotsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List the customer's depots.
    pub async fn list(&self, token: &Token) -> Result<Depots> {
        self.inner
            .get_json("/brokerage/clients/user/v3/depots", NO_QUERY, token)
            .await
    }

    /// Positions held in a depot.
    pub async fn positions(
        &self,
        token: &Token,
        depot_id: &DepotId,
        options: Option<PositionOptions>,
    ) -> Result<DepotPositions> {
        let options = options.unwrap_or_default();
        let query = PositionsQuery {
            with_attr: options.include_instrument.then_some("instrument"),
            without_attr: options.exclude_depot.then_some("depot"),
        };
        self.inner
            .get_json(&format!("/brokerage/v3/depots/{}/positions", depot_id), &query, token)
            .await
    }

    /// A single position of a depot.
    pub async fn position(
        &self,
        token: &Token,
        depot_id: &DepotId,
        position_id: &PositionId,
        include_instrument: bool,
    ) -> Result<DepotPosition> {
        let query = PositionsQuery {
            with_attr: include_instrument.then_some("instrument"),
            without_attr: None,
        };
        self.inner
            .get_json(
                &format!("/brokerage/v3/depots/{}/positions/{}", depot_id, position_id),
                &query,
                token,
            )
            .await
    }

    /// Transactions of a depot, optionally filtered.
    pub async fn transactions(
        &self,
        token: &Token,
        depot_id: &DepotId,
        query: Option<&DepotTransactionsQuery>,
    ) -> Result<DepotTransactions> {
        let path = format!("/brokerage/v3/depots/{}/transactions", depot_id);
        match query {
            Some(query) => self.inner.get_json(&path, query, token).await,
            None => self.inner.get_json(&path, NO_QUERY, token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depot_transactions_query_wire_names() {
        let query = DepotTransactionsQuery {
            instrument_id: Some("ABC".to_string()),
            booking_status: Some(BookingStatus::NotBooked),
            max_booking_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "instrumentId": "ABC",
                "bookingStatus": "NOTBOOKED",
                "maxBookingDate": "2024-03-01"
            })
        );
    }
}
