//! Per-second accounting of outbound requests.

use std::sync::Mutex;

use chrono::Utc;

/// Counts outbound requests per wall-clock second.
///
/// The API allows a fixed number of requests per second. The monitor only
/// reports when the ceiling is crossed; it never delays or drops a request.
#[derive(Debug)]
pub struct RequestMonitor {
    limit: u32,
    window: Mutex<Window>,
}

#[derive(Debug, Default)]
struct Window {
    second: i64,
    count: u32,
}

impl RequestMonitor {
    /// Create a monitor with the given per-second ceiling.
    pub fn new(limit_per_second: u32) -> Self {
        Self {
            limit: limit_per_second,
            window: Mutex::new(Window::default()),
        }
    }

    /// The configured per-second ceiling.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request in the current second.
    ///
    /// Returns `true` if the ceiling is exceeded.
    pub fn record(&self) -> bool {
        self.record_at(Utc::now().timestamp())
    }

    pub(crate) fn record_at(&self, second: i64) -> bool {
        let count = {
            let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
            // A caller that read the clock before a newer second was opened
            // counts into the newer window.
            if second > window.second {
                window.second = second;
                window.count = 0;
            }
            window.count += 1;
            window.count
        };

        let exceeded = count > self.limit;
        if exceeded {
            tracing::warn!(
                limit = self.limit,
                count,
                second,
                "Reaching request limit for current second"
            );
        }
        exceeded
    }

    /// Requests counted so far in the current second.
    pub fn current_count(&self) -> u32 {
        let now = Utc::now().timestamp();
        let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        if window.second == now {
            window.count
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_only_above_limit() {
        let monitor = RequestMonitor::new(3);
        let results: Vec<bool> = (0..5).map(|_| monitor.record_at(100)).collect();
        assert_eq!(results, vec![false, false, false, true, true]);
    }

    #[test]
    fn test_counter_resets_each_second() {
        let monitor = RequestMonitor::new(1);
        assert!(!monitor.record_at(100));
        assert!(monitor.record_at(100));
        assert!(!monitor.record_at(101));
    }

    #[test]
    fn test_late_older_second_counts_into_current_window() {
        let monitor = RequestMonitor::new(3);
        for _ in 0..5 {
            monitor.record_at(101);
        }
        assert!(monitor.record_at(100));
        assert!(monitor.record_at(101));

        let window = monitor.window.lock().unwrap();
        assert_eq!(window.second, 101);
        assert_eq!(window.count, 7);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let monitor = std::sync::Arc::new(RequestMonitor::new(u32::MAX));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = monitor.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        monitor.record_at(7);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let window = monitor.window.lock().unwrap();
        assert_eq!(window.count, 800);
    }
}
