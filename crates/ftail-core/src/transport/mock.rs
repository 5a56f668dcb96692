//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use url::Url;

use super::{ByteRange, Response, Transport, TransportError};

type Reply = Result<Response, TransportError>;

/// Replays queued probe and fetch replies in order and records what was asked.
/// An exhausted queue answers with a connection error.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    probes: Mutex<VecDeque<Reply>>,
    fetches: Mutex<VecDeque<Reply>>,
    probed: Mutex<Vec<String>>,
    fetched: Mutex<Vec<ByteRange>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn probe_size(self, size: u64) -> Self {
        self.probes.lock().unwrap().push_back(Ok(Response::sized(200, size)));
        self
    }

    pub(crate) fn probe_err(self, e: TransportError) -> Self {
        self.probes.lock().unwrap().push_back(Err(e));
        self
    }

    /// Fetch reply reporting `size` delivered bytes (body filled with `x`).
    pub(crate) fn fetch_size(self, size: u64) -> Self {
        self.fetch_body(vec![b'x'; size as usize])
    }

    pub(crate) fn fetch_body(self, body: Vec<u8>) -> Self {
        self.fetches
            .lock()
            .unwrap()
            .push_back(Ok(Response::with_body(206, body)));
        self
    }

    pub(crate) fn fetch_err(self, e: TransportError) -> Self {
        self.fetches.lock().unwrap().push_back(Err(e));
        self
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probed.lock().unwrap().len()
    }

    pub(crate) fn fetched(&self) -> Vec<ByteRange> {
        self.fetched.lock().unwrap().clone()
    }
}

fn exhausted() -> Reply {
    Err(TransportError::Connection("no scripted reply".to_string()))
}

impl Transport for ScriptedTransport {
    fn probe(&self, uri: &Url) -> Reply {
        self.probed.lock().unwrap().push(uri.to_string());
        self.probes.lock().unwrap().pop_front().unwrap_or_else(exhausted)
    }

    fn fetch(&self, _uri: &Url, range: ByteRange) -> Reply {
        self.fetched.lock().unwrap().push(range);
        self.fetches.lock().unwrap().pop_front().unwrap_or_else(exhausted)
    }
}

pub(crate) fn timeout() -> TransportError {
    TransportError::Timeout("operation timed out".to_string())
}
