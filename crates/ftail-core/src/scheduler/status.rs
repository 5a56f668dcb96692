//! Snapshot of a tailer's position, reported when following ends.

use std::fmt;

use crate::tail::Tailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailerStatus {
    pub uri: String,
    /// Bytes delivered to the consumer.
    pub offset: u64,
    /// Attempts since the last healthy cycle; equals `max_retries` after giving up.
    pub retries_so_far: u32,
    pub still_following: bool,
}

impl TailerStatus {
    pub fn of(tailer: &Tailer) -> Self {
        Self {
            uri: tailer.uri().to_string(),
            offset: tailer.offset(),
            retries_so_far: tailer.retries_so_far(),
            still_following: tailer.still_following(),
        }
    }
}

impl fmt::Display for TailerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} bytes", self.uri, self.offset)?;
        if self.retries_so_far > 0 {
            write!(f, " ({} failed attempts)", self.retries_so_far)?;
        }
        Ok(())
    }
}
