//! Value types shared by the banking and brokerage models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount or quantity with its unit (`EUR`, `XXX` for pieces).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Decimal value; the API transmits it as a string
    pub value: Decimal,
    /// Currency code or unit
    pub unit: String,
}

/// A price together with the time it was determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// The price itself
    pub price: Amount,
    /// Timestamp of the quote as sent by the server
    #[serde(default)]
    pub price_date_time: Option<String>,
}

/// A key/text pair the API uses for enumerations with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyText {
    /// Machine-readable key
    pub key: String,
    /// Human-readable label
    #[serde(default)]
    pub text: String,
}

/// Paging descriptor attached to list responses.
///
/// For results merged by the [`Pager`](crate::client::Pager), `matches` is an
/// estimate (pages fetched times page size), not an exact total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Offset of the first returned element
    #[serde(default)]
    pub index: usize,
    /// Number of matching elements
    #[serde(default)]
    pub matches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_from_string_value() {
        let amount: Amount = serde_json::from_str(r#"{"value":"1234.56","unit":"EUR"}"#).unwrap();
        assert_eq!(amount.value, dec!(1234.56));
        assert_eq!(amount.unit, "EUR");
    }

    #[test]
    fn test_paging_defaults() {
        let paging: Paging = serde_json::from_str("{}").unwrap();
        assert_eq!(paging, Paging::default());
    }
}
