//! One outer cycle for a single tailer: attempt, retry on errors, report, pace.

use crate::tail::{TailResult, Tailer};

use super::decide::{decide, Decision};
use super::pacer::Pacer;

/// How an outer cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A non-error result was produced and the regular wait has elapsed.
    Settled,
    /// The consumer lowered the flag during a retry burst.
    Cancelled,
    /// The retry ceiling was reached; the tailer is no longer following.
    GaveUp,
}

/// Drives `tailer` through one outer cycle.
///
/// Errors are retried within the cycle, each retry paced by the tailer's
/// next backoff wait, until a non-error result arrives, the consumer stops the
/// tailer, or `retries_so_far` reaches `max_retries`. Error results reach
/// `on_result` only when `always_callback` is set; successes always do;
/// no-change results only with `always_callback`. A settled cycle ends with
/// exactly one regular wait.
pub fn get_tail<P, F>(
    tailer: &mut Tailer,
    always_callback: bool,
    pacer: &P,
    on_result: &F,
) -> CycleOutcome
where
    P: Pacer + ?Sized,
    F: Fn(&TailResult, &Tailer) + ?Sized,
{
    let mut result = tailer.tail();
    loop {
        if result.is_error() && always_callback {
            on_result(&result, tailer);
        }
        match decide(
            result.state(),
            tailer.still_following(),
            tailer.retries_so_far(),
            tailer.max_retries(),
        ) {
            Decision::Settle => break,
            Decision::Cancelled => {
                tracing::debug!(uri = %tailer.uri(), "stopped during retries");
                return CycleOutcome::Cancelled;
            }
            Decision::GiveUp => {
                tailer.set_still_following(false);
                tracing::warn!(
                    uri = %tailer.uri(),
                    attempts = tailer.retries_so_far(),
                    offset = tailer.offset(),
                    "giving up after repeated failures"
                );
                return CycleOutcome::GaveUp;
            }
            Decision::Retry => {
                let wait = tailer.error_wait();
                tracing::debug!(
                    uri = %tailer.uri(),
                    attempt = tailer.retries_so_far(),
                    wait_secs = wait.as_secs(),
                    error = %result.error_detail().map(|e| e.to_string()).unwrap_or_default(),
                    "retrying after backoff"
                );
                pacer.pause(wait);
                result = tailer.tail();
            }
        }
    }

    if result.is_success() || always_callback {
        on_result(&result, tailer);
    }
    if tailer.verbose() {
        tracing::info!("now at {} for {}", tailer.offset(), tailer.uri());
    } else {
        tracing::debug!("now at {} for {}", tailer.offset(), tailer.uri());
    }
    pacer.pause(tailer.regular_wait());
    CycleOutcome::Settled
}
