//! libcurl-backed transport: HEAD probe and Range GET with `curl::easy::Easy`.

use std::str;
use std::time::Duration;

use url::Url;

use super::error::{check_status, TransportError};
use super::parse::{parse_headers, ResponseHeaders};
use super::range::ByteRange;
use super::{Response, Transport};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking transport built on libcurl. Each request uses a fresh `Easy`
/// handle, so one instance can be shared across tailer threads.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    fn easy(&self, uri: &Url) -> Result<curl::easy::Easy, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(uri.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;
        Ok(easy)
    }
}

/// Runs the transfer, collecting header lines and (optionally) the body.
fn perform(
    easy: &mut curl::easy::Easy,
    body: Option<&mut Vec<u8>>,
) -> Result<ResponseHeaders, TransportError> {
    let mut lines: Vec<String> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        if let Some(body) = body {
            transfer.write_function(move |data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
        }
        transfer.perform()?;
    }
    Ok(parse_headers(&lines))
}

impl Transport for CurlTransport {
    fn probe(&self, uri: &Url) -> Result<Response, TransportError> {
        let mut easy = self.easy(uri)?;
        easy.nobody(true)?; // HEAD request
        let headers = perform(&mut easy, None)?;

        let status = easy.response_code()?;
        check_status(status)?;
        let content_length = headers.content_length.ok_or(TransportError::MissingLength)?;
        tracing::trace!(%uri, status, content_length, "probe");

        Ok(Response {
            status,
            content_length,
            body: Vec::new(),
            accept_ranges: headers.accept_ranges,
            etag: headers.etag,
            last_modified: headers.last_modified,
        })
    }

    fn fetch(&self, uri: &Url, range: ByteRange) -> Result<Response, TransportError> {
        let mut easy = self.easy(uri)?;
        easy.range(&range.curl_range())?;
        let mut body = Vec::with_capacity(range.len().min(1 << 20) as usize);
        let headers = perform(&mut easy, Some(&mut body))?;

        let status = easy.response_code()?;
        check_status(status)?;
        if status == 200 && range.start > 0 {
            return Err(TransportError::RangeIgnored {
                range: range.header_value(),
            });
        }
        // Chunked responses carry no Content-Length; fall back to what arrived.
        let content_length = headers.content_length.unwrap_or(body.len() as u64);
        tracing::trace!(%uri, status, range = %range.header_value(), content_length, "fetch");

        Ok(Response {
            status,
            content_length,
            body,
            accept_ranges: headers.accept_ranges,
            etag: headers.etag,
            last_modified: headers.last_modified,
        })
    }
}
