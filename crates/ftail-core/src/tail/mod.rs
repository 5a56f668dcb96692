//! Per-resource tail state machine.
//!
//! A [`Tailer`] owns the cursor and retry bookkeeping for one remote resource;
//! each [`Tailer::tail`] call performs one probe-and-maybe-fetch cycle and
//! reports it as a [`TailResult`].

mod result;
mod tailer;
mod target;

pub use result::{Method, TailError, TailResult, TailState};
pub use tailer::{Tailer, DEFAULT_MAX_RETRIES, DEFAULT_WAIT_SECS};
pub use target::{TargetSpec, Targets};
