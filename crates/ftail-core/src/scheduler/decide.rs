//! Retry-vs-stop decision after each tail attempt.
//!
//! Kept as a pure function of the attempt outcome and the tailer's counters so
//! the tailer only reports outcomes and the scheduler alone decides what
//! happens next.

use crate::tail::TailState;

/// What the scheduler does after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Non-error result: report it and pace with the regular wait.
    Settle,
    /// Error with retries left: pace with the next backoff wait, try again.
    Retry,
    /// Error and the retry ceiling is reached: stop following for good.
    GiveUp,
    /// Error while the consumer has asked to stop: return without waiting.
    Cancelled,
}

pub fn decide(
    state: TailState,
    still_following: bool,
    retries_so_far: u32,
    max_retries: u32,
) -> Decision {
    if state != TailState::Error {
        return Decision::Settle;
    }
    if !still_following {
        return Decision::Cancelled;
    }
    if retries_so_far >= max_retries {
        return Decision::GiveUp;
    }
    Decision::Retry
}
