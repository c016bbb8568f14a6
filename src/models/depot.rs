//! Brokerage models: depots, positions and depot transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{Amount, Paging, Price};

/// A securities depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depot {
    /// Unique depot id used in URLs
    pub depot_id: String,
    /// Depot number as shown to the customer
    #[serde(default)]
    pub depot_display_id: Option<String>,
    /// Owning client id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Default settlement account
    #[serde(default)]
    pub default_settlement_account_id: Option<String>,
    /// All settlement accounts
    #[serde(default)]
    pub settlement_account_ids: Vec<String>,
}

/// List of depots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depots {
    /// Paging information
    #[serde(default)]
    pub paging: Paging,
    /// Depots of the user
    #[serde(default)]
    pub values: Vec<Depot>,
}

/// Security master data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Instrument id
    #[serde(default)]
    pub instrument_id: Option<String>,
    /// German securities identification number
    #[serde(default)]
    pub wkn: Option<String>,
    /// ISIN
    #[serde(default)]
    pub isin: Option<String>,
    /// Ticker-like mnemonic
    #[serde(default)]
    pub mnemonic: Option<String>,
    /// Full name
    #[serde(default)]
    pub name: Option<String>,
    /// Short name
    #[serde(default)]
    pub short_name: Option<String>,
}

/// A position held in a depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotPosition {
    /// Depot id
    pub depot_id: String,
    /// Position id
    pub position_id: String,
    /// WKN of the security
    #[serde(default)]
    pub wkn: Option<String>,
    /// Custody type
    #[serde(default)]
    pub custody_type: Option<String>,
    /// Held quantity
    #[serde(default)]
    pub quantity: Option<Amount>,
    /// Quantity available for sale
    #[serde(default)]
    pub available_quantity: Option<Amount>,
    /// Current price
    #[serde(default)]
    pub current_price: Option<Price>,
    /// Average purchase price
    #[serde(default)]
    pub purchase_price: Option<Amount>,
    /// Previous day's price
    #[serde(default)]
    pub prev_day_price: Option<Price>,
    /// Current market value
    #[serde(default)]
    pub current_value: Option<Amount>,
    /// Purchase value
    #[serde(default)]
    pub purchase_value: Option<Amount>,
    /// Absolute profit/loss against purchase value
    #[serde(default)]
    pub profit_loss_purchase_abs: Option<Amount>,
    /// Relative profit/loss against purchase value, in percent
    #[serde(default)]
    pub profit_loss_purchase_rel: Option<String>,
    /// Instrument data, present with `with-attr=instrument`
    #[serde(default)]
    pub instrument: Option<Instrument>,
}

/// Positions of a depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotPositions {
    /// Paging information
    #[serde(default)]
    pub paging: Paging,
    /// Depot-wide aggregates, passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<serde_json::Value>,
    /// Positions
    #[serde(default)]
    pub values: Vec<DepotPosition>,
}

/// Booking status filter for depot transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    /// Booked transactions
    Booked,
    /// Not yet booked transactions
    #[serde(rename = "NOTBOOKED")]
    NotBooked,
    /// Both
    Both,
}

impl BookingStatus {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "BOOKED",
            BookingStatus::NotBooked => "NOTBOOKED",
            BookingStatus::Both => "BOTH",
        }
    }
}

/// A depot transaction (purchase, sale, transfer, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotTransaction {
    /// Transaction id
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Instrument id
    #[serde(default)]
    pub instrument_id: Option<String>,
    /// Instrument data
    #[serde(default)]
    pub instrument: Option<Instrument>,
    /// Execution price
    #[serde(default)]
    pub execution_price: Option<Amount>,
    /// Transaction value
    #[serde(default)]
    pub transaction_value: Option<Amount>,
    /// `IN` or `OUT`
    #[serde(default)]
    pub transaction_direction: Option<String>,
    /// Transaction type, e.g. `BUY`
    #[serde(default)]
    pub transaction_type: Option<String>,
    /// FX rate applied
    #[serde(default)]
    pub fx_rate: Option<String>,
    /// Quantity
    #[serde(default)]
    pub quantity: Option<Amount>,
    /// Booking date
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    /// Business date
    #[serde(default)]
    pub business_date: Option<NaiveDate>,
    /// Booking status
    #[serde(default)]
    pub booking_status: Option<BookingStatus>,
}

/// Transactions of a depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotTransactions {
    /// Paging information
    #[serde(default)]
    pub paging: Paging,
    /// Transactions
    #[serde(default)]
    pub values: Vec<DepotTransaction>,
}
