//! Banking account models: balances and transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{Amount, KeyText, Paging};

/// Master data of a banking account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account id used in URLs
    pub account_id: String,
    /// Account number as shown to the customer
    #[serde(default)]
    pub account_display_id: Option<String>,
    /// Account currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Owning client id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Account type (checking, savings, ...)
    #[serde(default)]
    pub account_type: Option<KeyText>,
    /// IBAN
    #[serde(default)]
    pub iban: Option<String>,
    /// Granted credit limit
    #[serde(default)]
    pub credit_limit: Option<Amount>,
}

/// Current balance of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    /// Account master data, absent when excluded via `without-attr=account`
    #[serde(default)]
    pub account: Option<Account>,
    /// Account id
    pub account_id: String,
    /// Balance in account currency
    pub balance: Amount,
    /// Balance in EUR
    #[serde(default, rename = "balanceEUR")]
    pub balance_eur: Option<Amount>,
    /// Cash available for disposal
    #[serde(default)]
    pub available_cash_amount: Option<Amount>,
    /// Cash available for disposal in EUR
    #[serde(default, rename = "availableCashAmountEUR")]
    pub available_cash_amount_eur: Option<Amount>,
}

/// List of account balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalances {
    /// Paging information
    #[serde(default)]
    pub paging: Paging,
    /// One entry per account
    #[serde(default)]
    pub values: Vec<AccountBalance>,
}

/// Which transactions to include by booking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionState {
    /// Booked and not yet booked
    Both,
    /// Booked only
    #[default]
    Booked,
    /// Not yet booked only
    #[serde(rename = "NOTBOOKED")]
    NotBooked,
}

impl TransactionState {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Both => "BOTH",
            TransactionState::Booked => "BOOKED",
            TransactionState::NotBooked => "NOTBOOKED",
        }
    }
}

/// Counterparty of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    /// Holder name
    #[serde(default)]
    pub holder_name: Option<String>,
    /// IBAN, if known
    #[serde(default)]
    pub iban: Option<String>,
    /// BIC, if known
    #[serde(default)]
    pub bic: Option<String>,
}

/// A single account transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTransaction {
    /// Bank reference
    #[serde(default)]
    pub reference: Option<String>,
    /// `BOOKED` or `NOTBOOKED`
    #[serde(default)]
    pub booking_status: Option<String>,
    /// Booking date, absent for unbooked transactions
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    /// Value date
    #[serde(default)]
    pub valuta_date: Option<NaiveDate>,
    /// Signed amount
    #[serde(default)]
    pub amount: Option<Amount>,
    /// Remitter
    #[serde(default)]
    pub remitter: Option<Counterparty>,
    /// Debtor
    #[serde(default)]
    pub debtor: Option<Counterparty>,
    /// Creditor
    #[serde(default)]
    pub creditor: Option<Counterparty>,
    /// Transaction type
    #[serde(default)]
    pub transaction_type: Option<KeyText>,
    /// Remittance information
    #[serde(default)]
    pub remittance_info: Option<String>,
    /// End-to-end reference
    #[serde(default)]
    pub end_to_end_reference: Option<String>,
    /// Whether the transaction is new since the last login
    #[serde(default)]
    pub new_transaction: bool,
}

/// A page (or merged pages) of account transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTransactions {
    /// Paging information; an estimate for merged results
    #[serde(default)]
    pub paging: Paging,
    /// Aggregated figures of the first page, passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<serde_json::Value>,
    /// Transactions in server order
    #[serde(default)]
    pub values: Vec<AccountTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_deserialization() {
        let json = serde_json::json!({
            "account": {
                "accountId": "A1",
                "accountDisplayId": "123456789",
                "currency": "EUR",
                "accountType": {"key": "CA", "text": "Girokonto"},
                "iban": "DE00123456789"
            },
            "accountId": "A1",
            "balance": {"value": "100.50", "unit": "EUR"},
            "balanceEUR": {"value": "100.50", "unit": "EUR"},
            "availableCashAmount": {"value": "600.50", "unit": "EUR"}
        });

        let balance: AccountBalance = serde_json::from_value(json).unwrap();
        assert_eq!(balance.account_id, "A1");
        assert_eq!(balance.balance.value, dec!(100.50));
        assert_eq!(balance.account.unwrap().account_type.unwrap().key, "CA");
        assert!(balance.available_cash_amount_eur.is_none());
    }

    #[test]
    fn test_transaction_state_wire_format() {
        assert_eq!(
            serde_json::to_string(&TransactionState::NotBooked).unwrap(),
            "\"NOTBOOKED\""
        );
        assert_eq!(TransactionState::Both.as_str(), "BOTH");
    }

    #[test]
    fn test_unbooked_transaction_has_no_booking_date() {
        let json = serde_json::json!({
            "bookingStatus": "NOTBOOKED",
            "amount": {"value": "-12.00", "unit": "EUR"},
            "remittanceInfo": "01Coffee"
        });
        let txn: AccountTransaction = serde_json::from_value(json).unwrap();
        assert!(txn.booking_date.is_none());
        assert_eq!(txn.amount.unwrap().value, dec!(-12.00));
    }
}
