//! ftail core: follow growing HTTP resources and deliver only appended bytes.
//!
//! A [`Tailer`](tail::Tailer) probes one resource with HEAD and fetches the new
//! byte range with a ranged GET; the [`scheduler`] drives tailers through
//! retries with backoff and regular pacing until they stop.

pub mod config;
pub mod logging;

pub mod backoff;
pub mod control;
pub mod error;
pub mod scheduler;
pub mod tail;
pub mod transport;

pub use control::{FollowControl, StopFlag};
pub use error::ValidationError;
pub use scheduler::{follow, follow_round_robin, get_tail, Pacer, ScheduleMode, TailerStatus};
pub use tail::{Method, TailResult, TailState, Tailer, TargetSpec, Targets};
pub use transport::{CurlTransport, Transport};
