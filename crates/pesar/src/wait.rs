//! Stabilization waits.
//!
//! A stabilization wait lets a page's asynchronous rendering and network
//! activity settle before further interaction. Two strategies ship: the
//! classic fixed-delay pause (a heuristic network-idle proxy, kept for
//! parity with the original suite) and genuine idle detection driven by an
//! in-flight request counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::result::{PesarError, PesarResult};

/// Default stabilization pause (ms)
pub const STABILIZATION_INTERVAL_MS: u64 = 1000;

/// Default stabilization timeout (ms)
pub const STABILIZATION_TIMEOUT_MS: u64 = 10_000;

/// Fixed settle pause after navigation (ms)
pub const POST_VISIT_SETTLE_MS: u64 = 1000;

/// Bounded wait after triggering a calculation (ms)
pub const CALCULATE_WAIT_TIMEOUT_MS: u64 = 5000;

/// Network considered idle after this long without in-flight requests (ms)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Polling interval for condition re-evaluation (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// How a stabilization wait decides the page has settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilizationStrategy {
    /// Pause a fixed interval after the body becomes visible
    FixedDelay {
        /// Pause duration (ms)
        interval_ms: u64,
    },
    /// Wait until no request has been in flight for a threshold window
    NetworkIdle {
        /// Idle window (ms)
        threshold_ms: u64,
    },
}

impl Default for StabilizationStrategy {
    fn default() -> Self {
        Self::FixedDelay {
            interval_ms: STABILIZATION_INTERVAL_MS,
        }
    }
}

/// A configured stabilization wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizationWait {
    /// Overall timeout (ms)
    pub timeout_ms: u64,
    /// Settlement strategy
    pub strategy: StabilizationStrategy,
}

impl Default for StabilizationWait {
    fn default() -> Self {
        Self {
            timeout_ms: STABILIZATION_TIMEOUT_MS,
            strategy: StabilizationStrategy::default(),
        }
    }
}

impl StabilizationWait {
    /// Default wait (fixed 1000 ms delay, 10 s timeout)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Use network-idle detection instead of a fixed delay
    #[must_use]
    pub const fn with_network_idle(mut self) -> Self {
        self.strategy = StabilizationStrategy::NetworkIdle {
            threshold_ms: NETWORK_IDLE_THRESHOLD_MS,
        };
        self
    }

    /// The bounded wait used after a calculation is triggered
    #[must_use]
    pub fn after_calculate() -> Self {
        Self::default().with_timeout(CALCULATE_WAIT_TIMEOUT_MS)
    }
}

/// Counter of requests currently in flight, shared with the interception
/// layer. Idle means the count has been zero for a threshold window.
#[derive(Debug, Clone, Default)]
pub struct InFlightCounter {
    count: Arc<AtomicUsize>,
    last_activity: Arc<Mutex<Option<Instant>>>,
}

impl InFlightCounter {
    /// New counter with no activity recorded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request leaving for the network
    pub fn request_started(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.touch();
    }

    /// Record a request completing (success or failure)
    pub fn request_finished(&self) {
        // Responses can arrive for requests started before counting began.
        let _ = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        self.touch();
    }

    /// Requests currently in flight
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Whether the network has been idle for the threshold window
    #[must_use]
    pub fn idle_for(&self, threshold: Duration) -> bool {
        if self.in_flight() > 0 {
            return false;
        }
        match *self.last_activity.lock().unwrap_or_else(|e| e.into_inner()) {
            // No request ever observed counts as idle.
            None => true,
            Some(last) => last.elapsed() >= threshold,
        }
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_activity.lock() {
            *guard = Some(Instant::now());
        }
    }
}

/// Poll a condition until it holds or the timeout elapses.
///
/// Assertions re-evaluate their condition repeatedly rather than failing
/// immediately; this is the synchronous primitive behind that behavior.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut condition: F) -> PesarResult<()>
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(PesarError::Timeout {
                ms: timeout.as_millis() as u64,
            });
        }
        std::thread::sleep(interval.min(deadline.saturating_duration_since(Instant::now())));
    }
}
