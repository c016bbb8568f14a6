//! Proactive refresh of registered tokens nearing expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::Token;
use crate::client::http::ClientInner;
use crate::Error;

/// Configuration for the [`BackgroundRefresher`].
///
/// # Example
///
/// ```
/// use comdirect_rs::auth::RefresherConfig;
/// use std::time::Duration;
///
/// let config = RefresherConfig::default()
///     .with_scan_interval(Duration::from_secs(10))
///     .with_expiry_threshold(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct RefresherConfig {
    /// How often the registry is scanned
    pub scan_interval: Duration,
    /// Tokens expiring within this period are refreshed
    pub expiry_threshold: Duration,
    /// Capacity of the queue between scanner and refresher
    pub queue_capacity: usize,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(30),
            expiry_threshold: Duration::from_secs(120),
            queue_capacity: 16,
        }
    }
}

impl RefresherConfig {
    /// Set the scan interval.
    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    /// Set the expiry threshold.
    pub fn with_expiry_threshold(mut self, threshold: Duration) -> Self {
        self.expiry_threshold = threshold;
        self
    }

    /// Set the queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Handle to the background refresh tasks.
///
/// A scanner task periodically looks for registered tokens about to expire
/// and queues them; a refresher task refreshes queued tokens one by one.
/// A token that is busy with a request is skipped and picked up again by a
/// later scan. A token the token endpoint refuses to refresh is removed
/// from the registry; transport errors leave it for the next scan. Both tasks stop once the cancellation token fires; no token
/// is refreshed after that.
///
/// Dropping the handle does not stop the tasks; call
/// [`cancel`](Self::cancel) or [`shutdown`](Self::shutdown).
#[derive(Debug)]
pub struct BackgroundRefresher {
    cancel: CancellationToken,
    scanner: JoinHandle<()>,
    refresher: JoinHandle<()>,
}

impl BackgroundRefresher {
    pub(crate) fn spawn(
        inner: Arc<ClientInner>,
        config: RefresherConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let threshold = config.expiry_threshold;

        tracing::info!(
            scan_interval_secs = config.scan_interval.as_secs_f64(),
            expiry_threshold_secs = config.expiry_threshold.as_secs_f64(),
            "Starting background token refresher"
        );

        let scanner = tokio::spawn(scan_loop(inner.clone(), config, tx, cancel.clone()));
        let refresher = tokio::spawn(refresh_loop(inner, threshold, rx, cancel.clone()));

        Self {
            cancel,
            scanner,
            refresher,
        }
    }

    /// Signal both tasks to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether either task is still running.
    pub fn is_running(&self) -> bool {
        !self.scanner.is_finished() || !self.refresher.is_finished()
    }

    /// Signal both tasks to stop and wait for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for (name, handle) in [("scanner", self.scanner), ("refresher", self.refresher)] {
            if let Err(e) = handle.await {
                tracing::warn!(task = name, error = %e, "Token refresh task panicked");
            }
        }
        tracing::info!("Background token refresher stopped");
    }
}

async fn scan_loop(
    inner: Arc<ClientInner>,
    config: RefresherConfig,
    tx: mpsc::Sender<Token>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.scan_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        for token in inner.registry.snapshot().await {
            if token.is_revoked() || !token.will_expire_in(config.expiry_threshold).await {
                continue;
            }
            tracing::debug!(session = %token.session_guid(), "Queueing token for refresh");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                sent = tx.send(token) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn refresh_loop(
    inner: Arc<ClientInner>,
    threshold: Duration,
    mut rx: mpsc::Receiver<Token>,
    cancel: CancellationToken,
) {
    loop {
        let token = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = rx.recv() => match next {
                Some(token) => token,
                None => return,
            },
        };

        if cancel.is_cancelled() {
            return;
        }
        // Queued twice before the first refresh landed
        if token.is_revoked() || !token.will_expire_in(threshold).await {
            continue;
        }
        if !inner.registry.contains(&token).await {
            continue;
        }

        match inner.refresh_token(&token).await {
            Ok(()) => {
                tracing::debug!(session = %token.session_guid(), "Token refreshed in background");
            }
            Err(Error::LockedToken) => {
                tracing::warn!(session = %token.session_guid(), "Token is locked, skipping refresh");
            }
            Err(e @ (Error::RefreshFailed(_) | Error::TokenRevoked)) => {
                tracing::error!(
                    session = %token.session_guid(),
                    error = %e,
                    "Token cannot be refreshed, removing it from the registry"
                );
                inner.registry.remove_token(&token).await;
            }
            Err(e) => {
                tracing::error!(session = %token.session_guid(), error = %e, "Background token refresh failed");
            }
        }
    }
}
