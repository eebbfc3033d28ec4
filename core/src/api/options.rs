//! Configuration options for the Safeval engine.

use std::time::Duration;

use crate::api::Blacklist;
use crate::evaluator::EvaluatorOptions;
use crate::parser::DEFAULT_MAX_DEPTH;

/// Configuration options for the Safeval engine.
///
/// Each compiled expression keeps its own copy of the options it was compiled
/// with, so reconfiguring an engine does not affect expressions that already
/// exist.
///
/// # Example
///
/// ```
/// use safeval_core::api::{Blacklist, EngineOptions};
///
/// let options = EngineOptions {
///     max_timeout_ms: 50,
///     blacklist: Blacklist::empty(),
///     ..EngineOptions::default()
/// };
/// assert!(options.strict_mode);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Reject session extensions that shadow registered functions.
    ///
    /// Default: true
    pub strict_mode: bool,

    /// Soft deadline for one evaluation, in milliseconds. `0` disables it.
    ///
    /// Default: 1000
    pub max_timeout_ms: u64,

    /// Identifiers rejected anywhere in the source text.
    pub blacklist: Blacklist,

    /// Maximum nesting depth for parsing and evaluation.
    ///
    /// Default: 256
    pub max_depth: usize,

    /// Number of compiled programs the engine keeps. `0` disables caching.
    ///
    /// Default: 128
    pub cache_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict_mode: true,
            max_timeout_ms: 1000,
            blacklist: Blacklist::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            cache_capacity: 128,
        }
    }
}

impl EngineOptions {
    /// The evaluation deadline, or `None` when timeouts are disabled.
    pub fn timeout(&self) -> Option<Duration> {
        match self.max_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub(crate) fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            max_depth: self.max_depth,
            timeout: self.timeout(),
        }
    }

    /// Merge override options into these options.
    pub fn override_with(&self, overrides: &EngineOptionsOverride) -> Self {
        Self {
            strict_mode: overrides.strict_mode.unwrap_or(self.strict_mode),
            max_timeout_ms: overrides.max_timeout_ms.unwrap_or(self.max_timeout_ms),
            blacklist: overrides
                .blacklist
                .clone()
                .unwrap_or_else(|| self.blacklist.clone()),
            max_depth: overrides.max_depth.unwrap_or(self.max_depth),
            cache_capacity: overrides.cache_capacity.unwrap_or(self.cache_capacity),
        }
    }
}

/// Partial options: every field that is `Some` replaces the current value.
///
/// # Example
///
/// ```
/// use safeval_core::api::{EngineOptions, EngineOptionsOverride};
///
/// let overrides = EngineOptionsOverride::default()
///     .strict_mode(false)
///     .max_timeout_ms(10);
/// let options = EngineOptions::default().override_with(&overrides);
/// assert!(!options.strict_mode);
/// assert_eq!(options.max_timeout_ms, 10);
/// assert_eq!(options.max_depth, 256);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOptionsOverride {
    pub strict_mode: Option<bool>,
    pub max_timeout_ms: Option<u64>,
    pub blacklist: Option<Blacklist>,
    pub max_depth: Option<usize>,
    pub cache_capacity: Option<usize>,
}

impl EngineOptionsOverride {
    pub fn strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = Some(strict_mode);
        self
    }

    pub fn max_timeout_ms(mut self, max_timeout_ms: u64) -> Self {
        self.max_timeout_ms = Some(max_timeout_ms);
        self
    }

    pub fn blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = Some(cache_capacity);
        self
    }
}
