//! Upstream reconnect policy.

use std::time::Duration;

/// How the invoice consumer waits between subscription attempts.
///
/// The delay after the `n`-th consecutive failure (starting at 0) is
/// `initial_delay * multiplier^n`, capped at `max_delay`. Once
/// `max_attempts` consecutive attempts have failed the circuit opens: the
/// consumer reports it at error level, waits `circuit_open_delay` and starts
/// counting from zero again. It never gives up for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    /// Consecutive failures before the circuit opens. `0` disables the
    /// circuit breaker.
    pub max_attempts: u32,
    pub circuit_open_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            multiplier: 2,
            max_attempts: 10,
            circuit_open_delay: Duration::from_secs(600),
        }
    }
}

impl ReconnectPolicy {
    /// A policy that always waits `delay`, with no circuit breaker.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1,
            max_attempts: 0,
            circuit_open_delay: delay,
        }
    }

    /// Delay before the next attempt after `failures` consecutive failures
    /// (`failures >= 1`).
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Whether `failures` consecutive failures should open the circuit.
    pub fn circuit_open(&self, failures: u32) -> bool {
        self.max_attempts > 0 && failures >= self.max_attempts
    }
}
