//! Follow target specifications.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One resource to follow. Unset fields fall back to the config (or the
/// tailer's built-in defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub uri: String,
    /// Bytes already consumed; polling starts here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Base poll interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Report no-change and error results too, not just new data.
    #[serde(default)]
    pub always_callback: bool,
    /// Log the cursor position at info level after every healthy cycle.
    #[serde(default)]
    pub verbose: bool,
}

impl TargetSpec {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn wait(mut self, secs: u64) -> Self {
        self.wait = Some(secs);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn always_callback(mut self, on: bool) -> Self {
        self.always_callback = on;
        self
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }
}

/// Either a single target or a list of them.
///
/// Deserializes from one table or an array of tables; anything else is
/// rejected by serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    One(TargetSpec),
    Many(Vec<TargetSpec>),
}

impl Targets {
    /// Flatten into a list; an empty list is a validation error.
    pub fn into_specs(self) -> Result<Vec<TargetSpec>, ValidationError> {
        match self {
            Targets::One(spec) => Ok(vec![spec]),
            Targets::Many(specs) if specs.is_empty() => Err(ValidationError::NoTargets),
            Targets::Many(specs) => Ok(specs),
        }
    }
}

impl From<TargetSpec> for Targets {
    fn from(spec: TargetSpec) -> Self {
        Targets::One(spec)
    }
}

impl From<Vec<TargetSpec>> for Targets {
    fn from(specs: Vec<TargetSpec>) -> Self {
        Targets::Many(specs)
    }
}
