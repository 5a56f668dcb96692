//! Transport error type and classification of curl failures.

use thiserror::Error;

/// Failure reported by a [`Transport`](super::Transport) for one request.
///
/// The first three kinds are transient network failures; the rest are
/// HTTP-level problems that are surfaced the same way (as an error result)
/// but are unlikely to go away on their own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connect or transfer timed out.
    #[error("timed out: {0}")]
    Timeout(String),
    /// Could not reach the host (refused, DNS, proxy).
    #[error("connection failed: {0}")]
    Connection(String),
    /// Stream ended before a complete response arrived.
    #[error("connection closed early: {0}")]
    PrematureClose(String),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// HEAD response carried no usable `Content-Length`.
    #[error("response has no Content-Length")]
    MissingLength,
    /// Server answered a range starting past zero with the whole body (200).
    #[error("server ignored Range {range}; answered with the full body")]
    RangeIgnored { range: String },
    /// Anything else curl reported.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// True for timeouts, connection failures and premature closes.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_)
                | TransportError::Connection(_)
                | TransportError::PrematureClose(_)
        )
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        let detail = e.to_string();
        if e.is_operation_timedout() {
            return TransportError::Timeout(detail);
        }
        if e.is_couldnt_connect() || e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
            return TransportError::Connection(detail);
        }
        if e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
            || e.is_partial_file()
        {
            return TransportError::PrematureClose(detail);
        }
        TransportError::Other(detail)
    }
}

/// Maps a response status to an error for anything outside 2xx.
pub fn check_status(code: u32) -> Result<(), TransportError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(TransportError::Status(code))
    }
}
