//! Scheduling of tailers.
//!
//! [`get_tail`] drives one tailer through a single outer cycle (attempt,
//! retries with backoff, callback, pacing). [`follow`] and
//! [`follow_round_robin`] repeat outer cycles over a set of targets until
//! every tailer has stopped.

mod cycle;
mod decide;
mod follow;
mod pacer;
mod status;
#[cfg(test)]
mod testing;

pub use cycle::{get_tail, CycleOutcome};
pub use decide::{decide, Decision};
pub use follow::{follow, follow_round_robin, follow_with, ScheduleMode};
pub use pacer::{ControlledPacer, Pacer, ThreadPacer};
pub use status::TailerStatus;
