//! The tailer: cursor, retry counters and backoff for one resource.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::backoff::BackoffSchedule;
use crate::control::StopFlag;
use crate::error::ValidationError;
use crate::transport::{ByteRange, Transport};

use super::result::{Method, TailError, TailResult};
use super::target::TargetSpec;

/// Poll interval used when a target does not set one.
pub const DEFAULT_WAIT_SECS: u64 = 60;
/// Retry ceiling used when a target does not set one.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Polls one growing resource and fetches only the bytes appended since the
/// last successful fetch.
///
/// `offset` only moves on a successful fetch, by exactly the length the fetch
/// response reports. `retries_so_far` counts attempts since the last healthy
/// cycle; the scheduler compares it to `max_retries` to decide when to give up.
pub struct Tailer {
    uri: Url,
    offset: u64,
    wait_in_seconds: u64,
    backoff: BackoffSchedule,
    max_retries: u32,
    retries_so_far: u32,
    following: StopFlag,
    verbose: bool,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Tailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tailer")
            .field("uri", &self.uri.as_str())
            .field("offset", &self.offset)
            .field("wait_in_seconds", &self.wait_in_seconds)
            .field("max_retries", &self.max_retries)
            .field("retries_so_far", &self.retries_so_far)
            .field("still_following", &self.following.is_following())
            .finish_non_exhaustive()
    }
}

/// Parses and checks a follow uri: absolute, http or https.
pub(crate) fn parse_uri(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingUri);
    }
    let url = Url::parse(raw).map_err(|source| ValidationError::InvalidUri {
        uri: raw.to_string(),
        source,
    })?;
    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> Result<(), ValidationError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::UnsupportedScheme {
            uri: url.to_string(),
            scheme: other.to_string(),
        }),
    }
}

impl Tailer {
    /// Builds a tailer from a target spec; unset fields take the defaults
    /// (offset 0, wait 60s, 5 retries).
    pub fn new(spec: &TargetSpec, transport: Arc<dyn Transport>) -> Result<Self, ValidationError> {
        let uri = parse_uri(&spec.uri)?;
        let wait_in_seconds = spec.wait.unwrap_or(DEFAULT_WAIT_SECS);
        if wait_in_seconds == 0 {
            return Err(ValidationError::ZeroWait {
                uri: uri.to_string(),
            });
        }
        let max_retries = spec.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries == 0 {
            return Err(ValidationError::ZeroMaxRetries {
                uri: uri.to_string(),
            });
        }

        Ok(Self {
            uri,
            offset: spec.offset.unwrap_or(0),
            wait_in_seconds,
            backoff: BackoffSchedule::build(wait_in_seconds, max_retries),
            max_retries,
            retries_so_far: 0,
            following: StopFlag::new(),
            verbose: spec.verbose,
            transport,
        })
    }

    /// Builds a tailer with default settings for an already parsed URL.
    pub fn from_url(uri: Url, transport: Arc<dyn Transport>) -> Result<Self, ValidationError> {
        check_scheme(&uri)?;
        Ok(Self {
            uri,
            offset: 0,
            wait_in_seconds: DEFAULT_WAIT_SECS,
            backoff: BackoffSchedule::build(DEFAULT_WAIT_SECS, DEFAULT_MAX_RETRIES),
            max_retries: DEFAULT_MAX_RETRIES,
            retries_so_far: 0,
            following: StopFlag::new(),
            verbose: false,
            transport,
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Bytes delivered so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn wait_in_seconds(&self) -> u64 {
        self.wait_in_seconds
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retries_so_far(&self) -> u32 {
        self.retries_so_far
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn still_following(&self) -> bool {
        self.following.is_following()
    }

    /// Lowering the flag (e.g. from the result callback) stops this tailer
    /// before its next attempt.
    pub fn set_still_following(&self, following: bool) {
        self.following.set_following(following);
    }

    /// Shared handle to the activity flag, for stopping from another thread.
    pub fn stop_flag(&self) -> StopFlag {
        self.following.clone()
    }

    /// Remaining error-path waits.
    pub fn backoff(&self) -> &BackoffSchedule {
        &self.backoff
    }

    /// One probe-and-maybe-fetch cycle.
    ///
    /// Counts as an attempt whatever the outcome. Failures are captured in the
    /// returned result and leave the cursor untouched.
    pub fn tail(&mut self) -> TailResult {
        self.retries_so_far = self.retries_so_far.saturating_add(1);

        let probe = match self.transport.probe(&self.uri) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(uri = %self.uri, error = %e, "probe failed");
                return TailResult::error(Method::Head, e);
            }
        };

        let size_now = probe.content_length;
        if size_now == self.offset {
            return TailResult::no_change(probe);
        }
        if size_now < self.offset {
            tracing::warn!(
                uri = %self.uri,
                offset = self.offset,
                size = size_now,
                "resource shrank"
            );
            return TailResult::error(
                Method::Head,
                TailError::Shrunk {
                    offset: self.offset,
                    size: size_now,
                },
            );
        }

        let range = ByteRange::new(self.offset, size_now);
        let fetched = match self.transport.fetch(&self.uri, range) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(
                    uri = %self.uri,
                    range = %range.header_value(),
                    error = %e,
                    "fetch failed"
                );
                return TailResult::error(Method::Get, e);
            }
        };

        // Trust what the fetch says it delivered, not the probe.
        if fetched.content_length != range.len() {
            tracing::debug!(
                uri = %self.uri,
                requested = range.len(),
                delivered = fetched.content_length,
                "fetch length differs from probed growth"
            );
        }
        self.offset = self.offset.saturating_add(fetched.content_length);
        TailResult::success(fetched)
    }

    /// Wait before retrying after an error: the next backoff entry.
    pub fn error_wait(&mut self) -> Duration {
        self.backoff.next()
    }

    /// Wait after a healthy cycle. Rebuilds the backoff schedule and clears the
    /// retry count; always returns the base interval.
    pub fn regular_wait(&mut self) -> Duration {
        self.backoff.reset(self.wait_in_seconds, self.max_retries);
        self.retries_so_far = 0;
        Duration::from_secs(self.wait_in_seconds)
    }
}
