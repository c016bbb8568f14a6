//! Offset-based pagination over list endpoints.
//!
//! The API pages with a `paging-first` offset and a fixed page size of
//! [`PAGE_SIZE`]. [`Pager`] collects a requested amount of items eagerly;
//! [`PaginatedStream`] yields items lazily until the server runs dry.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::models::Paging;
use crate::Result;

/// Number of items per page.
pub const PAGE_SIZE: usize = 20;

/// Type alias for a boxed future used internally.
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Items merged from consecutive pages.
#[derive(Debug, Clone)]
pub struct PagedResult<T> {
    /// All items in page order.
    pub items: Vec<T>,
    /// Paging summary. `index` is always 0; `matches` is the number of
    /// non-empty pages times the page size, an upper bound on `items.len()`.
    pub paging: Paging,
    /// Number of non-empty pages fetched.
    pub pages: usize,
    /// Whether an empty page was seen, i.e. the server has no more items.
    pub exhausted: bool,
}

/// Collects items from an offset-paged endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pager {
    /// Create a pager with the given page size (at least 1).
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// The page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed for `amount` items; at least one.
    pub fn pages_for(&self, amount: usize) -> usize {
        amount.div_ceil(self.page_size).max(1)
    }

    /// Fetch pages at offsets `0, page_size, 2 * page_size, ...` until
    /// enough pages for `amount` items were received or a page comes back
    /// empty.
    ///
    /// Pages are fetched one after another. Whole pages are kept, so the
    /// result may hold more than `amount` items.
    ///
    /// # Errors
    ///
    /// The first fetch error is returned as is; items already collected
    /// are discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use comdirect_rs::Pager;
    ///
    /// # async fn example() -> comdirect_rs::Result<()> {
    /// let data: Vec<u32> = (0..45).collect();
    /// let result = Pager::default()
    ///     .collect(100, |offset| {
    ///         let page: Vec<u32> = data.iter().copied().skip(offset).take(20).collect();
    ///         async move { Ok(page) }
    ///     })
    ///     .await?;
    /// assert_eq!(result.items.len(), 45);
    /// assert!(result.exhausted);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn collect<T, F, Fut>(&self, amount: usize, mut fetch: F) -> Result<PagedResult<T>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let wanted = self.pages_for(amount);
        let mut items = Vec::new();
        let mut pages = 0;
        let mut exhausted = false;

        while pages < wanted {
            let offset = pages * self.page_size;
            tracing::trace!(offset, "Fetching page");

            let page = fetch(offset).await?;
            if page.is_empty() {
                exhausted = true;
                break;
            }
            items.extend(page);
            pages += 1;
        }

        tracing::debug!(pages, items = items.len(), exhausted, "Collected pages");

        Ok(PagedResult {
            items,
            paging: Paging {
                index: 0,
                matches: pages * self.page_size,
            },
            pages,
            exhausted,
        })
    }
}

/// A stream that lazily fetches pages from an offset-paged endpoint.
///
/// This stream yields individual items from each page, fetching the next
/// page when the current one is used up. It ends after the first empty
/// page or the first error.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use comdirect_rs::{AccountId, Token, TransactionState};
///
/// # async fn example(client: comdirect_rs::ComdirectClient, token: Token) -> comdirect_rs::Result<()> {
/// let account = AccountId::new("A1B2C3");
///
/// let mut stream = client
///     .accounts()
///     .transactions_stream(&token, &account, TransactionState::Booked);
///
/// while let Some(result) = stream.next().await {
///     let transaction = result?;
///     println!("{:?}", transaction.remittance_info);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PaginatedStream<T> {
    /// Function to fetch a page by offset.
    fetch_page: Box<dyn Fn(usize) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync>,
    page_size: usize,
    /// Current page, reversed so items pop off the end in order.
    current_items: Vec<T>,
    /// Next offset to fetch, None if exhausted.
    next_offset: Option<usize>,
    pending_fetch: Option<BoxFuture<'static, Result<Vec<T>>>>,
}

impl<T> PaginatedStream<T>
where
    T: Send + 'static,
{
    /// Create a new paginated stream.
    pub fn new<F>(page_size: usize, fetch_page: F) -> Self
    where
        F: Fn(usize) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync + 'static,
    {
        Self {
            fetch_page: Box::new(fetch_page),
            page_size: page_size.max(1),
            current_items: Vec::new(),
            next_offset: Some(0),
            pending_fetch: None,
        }
    }
}

impl<T> Stream for PaginatedStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(item) = this.current_items.pop() {
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(fut) = this.pending_fetch.as_mut() {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(mut page)) => {
                        this.pending_fetch = None;
                        if page.is_empty() {
                            this.next_offset = None;
                            return Poll::Ready(None);
                        }
                        this.next_offset = this.next_offset.map(|o| o + this.page_size);
                        page.reverse();
                        this.current_items = page;
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending_fetch = None;
                        this.next_offset = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            match this.next_offset {
                Some(offset) => {
                    this.pending_fetch = Some((this.fetch_page)(offset));
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

impl<T> Unpin for PaginatedStream<T> {}
