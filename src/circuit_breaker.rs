use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;

/// Tracks whether the generator backend is reachable.
///
/// Opens after `failure_threshold` consecutive failed calls and refuses calls
/// until `cooldown` has passed since the last failure. The first call after
/// the cooldown is let through; another failure re-opens immediately.
#[derive(Clone)]
pub struct CircuitBreaker {
    failures: Arc<AtomicU32>,
    opened_at: Arc<RwLock<Option<Instant>>>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        CircuitBreaker {
            failures: Arc::new(AtomicU32::new(0)),
            opened_at: Arc::new(RwLock::new(None)),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn allows_call(&self) -> bool {
        match *self.opened_at.read() {
            None => true,
            Some(at) => at.elapsed() >= self.cooldown,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.allows_call()
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        *self.opened_at.write() = None;
    }

    /// Returns true when this failure opened (or re-opened) the circuit
    pub fn record_failure(&self) -> bool {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.failure_threshold {
            *self.opened_at.write() = Some(Instant::now());
            tracing::warn!(
                failures,
                cooldown_secs = self.cooldown.as_secs(),
                "Generator circuit open"
            );
            return true;
        }
        false
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Doubling retry delay with an upper bound
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        ExponentialBackoff {
            initial: Duration::from_millis(initial_ms),
            max: Duration::from_millis(max_ms.max(initial_ms)),
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoff::new(500, 8000)
    }
}
