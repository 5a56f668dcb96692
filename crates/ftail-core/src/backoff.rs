//! Error-path backoff schedule.
//!
//! A schedule is a finite list of waits that doubles from the base poll
//! interval and is capped at the square of that interval. Each failed attempt
//! consumes one entry; the final entry is held rather than exhausted, so a
//! tailer in a long retry burst keeps waiting the longest interval.

use std::collections::VecDeque;
use std::time::Duration;

/// Ordered waits consulted only when a tail attempt errors.
///
/// Only the growing prefix is stored; every entry from the cap on is the same
/// value, kept as `held` with a repeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    growing: VecDeque<Duration>,
    held: Duration,
    /// Copies of `held` still in the schedule; at least one.
    held_count: u64,
}

impl BackoffSchedule {
    /// Builds `max_retries + 1` waits: `min(base * 2^i, base^2)` seconds.
    ///
    /// The first wait equals `base_secs`, the sequence never decreases and the
    /// last entry never exceeds `base_secs^2`.
    pub fn build(base_secs: u64, max_retries: u32) -> Self {
        let total = u64::from(max_retries) + 1;
        let cap = base_secs.saturating_mul(base_secs).max(base_secs);
        let mut growing = VecDeque::new();
        let mut current = base_secs;
        while (growing.len() as u64) < total && current < cap {
            growing.push_back(Duration::from_secs(current));
            current = current.saturating_mul(2);
        }
        let stored = growing.len() as u64;
        if stored == total {
            // Never reached the cap: the last grown entry is the one held.
            let held = growing.pop_back().unwrap_or_default();
            return Self {
                growing,
                held,
                held_count: 1,
            };
        }
        Self {
            growing,
            held: Duration::from_secs(cap),
            held_count: total - stored,
        }
    }

    /// Next wait. Consumes entries while more than one remains; the last is
    /// returned again on every call.
    pub fn next(&mut self) -> Duration {
        if let Some(wait) = self.growing.pop_front() {
            return wait;
        }
        if self.held_count > 1 {
            self.held_count -= 1;
        }
        self.held
    }

    /// Replace the remaining waits with a freshly built schedule.
    pub fn reset(&mut self, base_secs: u64, max_retries: u32) {
        *self = Self::build(base_secs, max_retries);
    }

    /// Number of waits left (never zero for a built schedule).
    pub fn len(&self) -> usize {
        let held = usize::try_from(self.held_count).unwrap_or(usize::MAX);
        self.growing.len().saturating_add(held)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wait every remaining call ends up returning.
    pub fn last(&self) -> Duration {
        self.held
    }

    /// The first `n` waits `next()` would return, without consuming them.
    pub fn peek(&self, n: usize) -> Vec<Duration> {
        let mut copy = self.clone();
        (0..n.min(self.len())).map(|_| copy.next()).collect()
    }

    /// Remaining waits in order.
    pub fn remaining(&self) -> Vec<Duration> {
        self.peek(self.len())
    }
}
