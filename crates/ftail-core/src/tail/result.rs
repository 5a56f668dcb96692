//! Outcome of a single tail attempt.

use std::fmt;

use thiserror::Error;

use crate::transport::{Response, TransportError};

/// What a tail attempt achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// New bytes were fetched.
    Success,
    /// Probe reported the size we already have.
    NoChange,
    /// Probe or fetch failed.
    Error,
}

/// Which request produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Head,
    Get,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Head => write!(f, "HEAD"),
            Method::Get => write!(f, "GET"),
        }
    }
}

/// Failure detail carried by an error result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TailError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Resource is now smaller than what was already delivered (truncated or
    /// rotated). The cursor is left alone.
    #[error("resource shrank to {size} bytes below offset {offset}")]
    Shrunk { offset: u64, size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Success(Response),
    NoChange(Response),
    Error(TailError),
}

/// Immutable result of one [`Tailer::tail`](super::Tailer::tail) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailResult {
    method: Method,
    outcome: Outcome,
}

impl TailResult {
    /// Fetched new bytes; always produced by a GET.
    pub fn success(response: Response) -> Self {
        Self {
            method: Method::Get,
            outcome: Outcome::Success(response),
        }
    }

    /// Nothing new; always produced by a HEAD.
    pub fn no_change(response: Response) -> Self {
        Self {
            method: Method::Head,
            outcome: Outcome::NoChange(response),
        }
    }

    pub fn error(method: Method, error: impl Into<TailError>) -> Self {
        Self {
            method,
            outcome: Outcome::Error(error.into()),
        }
    }

    pub fn state(&self) -> TailState {
        match self.outcome {
            Outcome::Success(_) => TailState::Success,
            Outcome::NoChange(_) => TailState::NoChange,
            Outcome::Error(_) => TailState::Error,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Probe response for no-change, fetch response for success.
    pub fn response(&self) -> Option<&Response> {
        match &self.outcome {
            Outcome::Success(r) | Outcome::NoChange(r) => Some(r),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_detail(&self) -> Option<&TailError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Newly appended bytes (empty unless successful).
    pub fn body(&self) -> &[u8] {
        match &self.outcome {
            Outcome::Success(r) => &r.body,
            _ => &[],
        }
    }

    /// Size reported by the response, if there is one.
    pub fn content_length(&self) -> Option<u64> {
        self.response().map(|r| r.content_length)
    }

    pub fn has_response(&self) -> bool {
        self.response().is_some()
    }

    pub fn is_success(&self) -> bool {
        self.state() == TailState::Success
    }

    pub fn is_error(&self) -> bool {
        self.state() == TailState::Error
    }
}
