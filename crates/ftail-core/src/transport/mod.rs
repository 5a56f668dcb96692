//! HTTP transport used by tailers: a metadata-only probe and a ranged fetch.
//!
//! The [`Transport`] trait is the seam between the tail state machine and the
//! network. [`CurlTransport`] is the production implementation (libcurl via
//! the `curl` crate); tests substitute scripted transports.

mod easy;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod parse;
mod range;

pub use easy::CurlTransport;
pub use error::{check_status, TransportError};
pub use parse::ResponseHeaders;
pub use range::ByteRange;

use url::Url;

/// Response metadata (and body, for fetches) returned by a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code of the final response.
    pub status: u32,
    /// Size reported by the response: the resource size for a probe, the
    /// number of bytes delivered for a fetch.
    pub content_length: u64,
    /// Body bytes; empty for probes.
    pub body: Vec<u8>,
    /// True if the server advertised `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Response {
    /// Probe-style response with only a size.
    pub fn sized(status: u32, content_length: u64) -> Self {
        Self {
            status,
            content_length,
            ..Self::default()
        }
    }

    /// Fetch-style response whose reported size is the body length.
    pub fn with_body(status: u32, body: Vec<u8>) -> Self {
        Self {
            status,
            content_length: body.len() as u64,
            body,
            ..Self::default()
        }
    }
}

/// Issues the two requests a tailer needs.
///
/// Implementations must bound every call with their own timeouts and report
/// network failures and non-2xx statuses as [`TransportError`]s rather than
/// panicking. Calls block the current thread.
pub trait Transport: Send + Sync {
    /// HEAD-equivalent request; `content_length` is the current resource size.
    fn probe(&self, uri: &Url) -> Result<Response, TransportError>;

    /// Ranged GET for `range`; `content_length` is the number of bytes delivered.
    fn fetch(&self, uri: &Url, range: ByteRange) -> Result<Response, TransportError>;
}
