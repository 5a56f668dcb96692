//! Validation errors raised synchronously while building tailers from target specs.
//!
//! These never enter the retry machinery: a bad target fails the call that
//! introduced it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Target spec had no `uri` (or an empty one).
    #[error("a uri must be given for every follow target")]
    MissingUri,
    /// The uri could not be parsed as an absolute URL.
    #[error("invalid uri {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
    /// Only http and https resources can be followed.
    #[error("unsupported scheme {scheme:?} in {uri}; expected http or https")]
    UnsupportedScheme { uri: String, scheme: String },
    /// Poll interval must be a positive number of seconds.
    #[error("wait must be at least one second for {uri}")]
    ZeroWait { uri: String },
    /// Retry ceiling must be positive.
    #[error("max_retries must be at least 1 for {uri}")]
    ZeroMaxRetries { uri: String },
    /// A sequence of targets was given but it was empty.
    #[error("expected a follow target or a non-empty list of targets")]
    NoTargets,
}
