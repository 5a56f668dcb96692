//! Follow control: the shared "still following" flag of each tailer and a
//! registry that can stop every tailer at once.
//!
//! A tailer's flag can be lowered from its result callback, from another
//! thread holding a [`StopFlag`] clone, or through [`FollowControl`] (used by
//! the CLI on Ctrl-C). The scheduler checks the flag at the top of every
//! cycle and after every failed attempt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Shared activity flag. Starts raised; lowering it asks the driving loop to
/// stop after the current request.
#[derive(Debug, Clone)]
pub struct StopFlag(Arc<AtomicBool>);

impl Default for StopFlag {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the tailer should keep polling.
    pub fn is_following(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set_following(&self, following: bool) {
        self.0.store(following, Ordering::Release);
    }

    /// Lower the flag.
    pub fn stop(&self) {
        self.set_following(false);
    }

    /// True if both handles share one flag.
    pub fn same_flag(&self, other: &StopFlag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Registry of uri -> stop flag for every tailer started by a follow call.
#[derive(Debug, Default)]
pub struct FollowControl {
    tailers: RwLock<Vec<(String, StopFlag)>>,
}

impl FollowControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tailer's flag so it can be stopped from outside.
    pub fn register(&self, uri: &str, flag: StopFlag) {
        if let Ok(mut tailers) = self.tailers.write() {
            tailers.push((uri.to_string(), flag));
        }
    }

    /// Drop a tailer's flag from the registry. Returns false if it was not
    /// registered.
    pub fn unregister(&self, flag: &StopFlag) -> bool {
        let Ok(mut tailers) = self.tailers.write() else {
            return false;
        };
        let before = tailers.len();
        tailers.retain(|(_, f)| !f.same_flag(flag));
        tailers.len() != before
    }

    /// Number of registered tailers, stopped or not.
    pub fn len(&self) -> usize {
        self.tailers.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop every tailer following `uri`. Returns how many were stopped.
    pub fn request_stop(&self, uri: &str) -> usize {
        let Ok(tailers) = self.tailers.read() else {
            return 0;
        };
        let mut stopped = 0;
        for (u, flag) in tailers.iter().filter(|(u, _)| u == uri) {
            tracing::debug!(uri = %u, "stop requested");
            flag.stop();
            stopped += 1;
        }
        stopped
    }

    /// Stop every registered tailer.
    pub fn stop_all(&self) {
        if let Ok(tailers) = self.tailers.read() {
            for (_, flag) in tailers.iter() {
                flag.stop();
            }
        }
    }

    /// Number of registered tailers whose flag is still raised.
    pub fn active(&self) -> usize {
        self.tailers
            .read()
            .map(|t| t.iter().filter(|(_, f)| f.is_following()).count())
            .unwrap_or(0)
    }
}
