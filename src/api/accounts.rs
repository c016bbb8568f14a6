//! Accounts service for balances and account transactions.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::auth::Token;
use crate::client::paginated::{PaginatedStream, Pager, PAGE_SIZE};
use crate::client::ClientInner;
use crate::models::{
    AccountBalance, AccountBalances, AccountId, AccountTransaction, AccountTransactions,
    TransactionState,
};
use crate::Result;

/// Service for account-related operations.
///
/// # Example
///
/// ```no_run
/// use comdirect_rs::TransactionState;
///
/// # async fn example(client: comdirect_rs::ComdirectClient, token: comdirect_rs::Token) -> comdirect_rs::Result<()> {
/// let balances = client.accounts().balances(&token, false).await?;
/// for balance in &balances.values {
///     println!("{}: {} {}", balance.account_id, balance.balance.value, balance.balance.unit);
/// }
///
/// if let Some(first) = balances.values.first() {
///     let transactions = client
///         .accounts()
///         .paginated_transactions(&token, &first.account_id.as_str().into(), TransactionState::Booked, 50, None)
///         .await?;
///     println!("{} transactions", transactions.values.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct AccountsService {
    inner: Arc<ClientInner>,
}

/// Options for listing account transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionOptions {
    /// Embed the account object in the response
    pub include_account: bool,
    /// Offset of the first transaction; 0 starts at the newest
    pub paging_first: usize,
}

pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, Serialize)]
struct BalancesQuery {
    #[serde(rename = "without-attr", skip_serializing_if = "Option::is_none")]
    without_attr: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct TransactionsQuery {
    #[serde(rename = "transactionState")]
    transaction_state: &'static str,
    #[serde(rename = "with-attr", skip_serializing_if = "Option::is_none")]
    with_attr: Option<&'static str>,
    #[serde(rename = "paging-first", skip_serializing_if = "Option::is_none")]
    paging_first: Option<usize>,
}

impl TransactionsQuery {
    fn new(state: TransactionState, include_account: bool, paging_first: usize) -> Self {
        Self {
            transaction_state: state.as_str(),
            with_attr: include_account.then_some("account"),
            paging_first: (paging_first > 0).then_some(paging_first),
        }
    }
}

impl AccountsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Balances of all accounts of the customer.
    ///
    /// With `exclude_account` the embedded account master data is left out.
    pub async fn balances(&self, token: &Token, exclude_account: bool) -> Result<AccountBalances> {
        let query = BalancesQuery {
            without_attr: exclude_account.then_some("account"),
        };
        self.inner
            .get_json("/banking/clients/user/v2/accounts/balances", &query, token)
            .await
    }

    /// Balance of a single account.
    pub async fn balance(&self, token: &Token, account_id: &AccountId) -> Result<AccountBalance> {
        self.inner
            .get_json(
                &format!("/banking/v2/accounts/{}/balances", account_id),
                NO_QUERY,
                token,
            )
            .await
    }

    /// One page of transactions of an account.
    pub async fn transactions(
        &self,
        token: &Token,
        account_id: &AccountId,
        state: TransactionState,
        options: Option<TransactionOptions>,
    ) -> Result<AccountTransactions> {
        let options = options.unwrap_or_default();
        let query = TransactionsQuery::new(state, options.include_account, options.paging_first);
        self.inner
            .get_json(&transactions_path(account_id), &query, token)
            .await
    }

    /// At least `amount` transactions (whole pages of [`PAGE_SIZE`]), or
    /// all there are if fewer.
    ///
    /// Pages are fetched one after another with the same token. The merged
    /// result carries the first page's aggregate and a paging summary of
    /// `{ index: 0, matches: pages * PAGE_SIZE }`. `options.paging_first`
    /// is ignored; paging always starts at the newest transaction.
    ///
    /// # Errors
    ///
    /// Any page error aborts the whole operation.
    pub async fn paginated_transactions(
        &self,
        token: &Token,
        account_id: &AccountId,
        state: TransactionState,
        amount: usize,
        options: Option<TransactionOptions>,
    ) -> Result<AccountTransactions> {
        let include_account = options.map(|o| o.include_account).unwrap_or(false);
        let path = transactions_path(account_id);
        let aggregated = Mutex::new(None);
        let pager = Pager::default();

        let result = {
            let path = &path;
            let aggregated = &aggregated;
            pager.collect(amount, move |offset| {
                let query = TransactionsQuery::new(state, include_account, offset);
                async move {
                    let page: AccountTransactions =
                        self.inner.get_json(path, &query, token).await?;
                    if offset == 0 {
                        *aggregated.lock().unwrap_or_else(|e| e.into_inner()) = page.aggregated;
                    }
                    Ok(page.values)
                }
            })
        }
        .await?;

        Ok(AccountTransactions {
            paging: result.paging,
            aggregated: aggregated.into_inner().unwrap_or_else(|e| e.into_inner()),
            values: result.items,
        })
    }

    /// Stream all transactions of an account.
    ///
    /// Pages are fetched lazily as the stream is polled, until the server
    /// returns an empty page. The token is cloned into the stream.
    pub fn transactions_stream(
        &self,
        token: &Token,
        account_id: &AccountId,
        state: TransactionState,
    ) -> PaginatedStream<AccountTransaction> {
        let inner = self.inner.clone();
        let token = token.clone();
        let path = transactions_path(account_id);

        PaginatedStream::new(PAGE_SIZE, move |offset| {
            let inner = inner.clone();
            let token = token.clone();
            let path = path.clone();
            let query = TransactionsQuery::new(state, false, offset);

            Box::pin(async move {
                let page: AccountTransactions = inner.get_json(&path, &query, &token).await?;
                Ok(page.values)
            })
        })
    }
}

fn transactions_path(account_id: &AccountId) -> String {
    format!("/banking/v1/accounts/{}/transactions", account_id)
}
