//! Pacing between tail attempts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::control::FollowControl;

/// Blocks the calling tailer for a wait computed by the scheduler.
pub trait Pacer: Send + Sync {
    fn pause(&self, wait: Duration);
}

/// Sleeps the current OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}

const DEFAULT_SLICE: Duration = Duration::from_millis(200);

/// Sleeps in short slices and returns early once no tailer registered with
/// the control is still following, so a stop-all does not wait out a full poll
/// interval.
#[derive(Debug, Clone)]
pub struct ControlledPacer {
    control: Arc<FollowControl>,
    slice: Duration,
}

impl ControlledPacer {
    pub fn new(control: Arc<FollowControl>) -> Self {
        Self {
            control,
            slice: DEFAULT_SLICE,
        }
    }

    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice.max(Duration::from_millis(1));
        self
    }
}

impl Pacer for ControlledPacer {
    fn pause(&self, wait: Duration) {
        // A wait too long to represent as an Instant has no deadline: it ends
        // only when every tailer has stopped.
        let deadline = Instant::now().checked_add(wait);
        loop {
            if self.control.active() == 0 {
                return;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    self.slice.min(deadline - now)
                }
                None => self.slice,
            };
            std::thread::sleep(slice);
        }
    }
}

impl<F> Pacer for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn pause(&self, wait: Duration) {
        self(wait)
    }
}
