//! Test helpers shared by scheduler tests.

use std::sync::Mutex;
use std::time::Duration;

use super::pacer::Pacer;

/// Records every requested wait instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingPacer {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, wait: Duration) {
        self.waits.lock().unwrap().push(wait);
    }
}
