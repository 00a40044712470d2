// packages/httptap/src/utils/config.rs
//! Interceptor configuration
//!
//! Defaults are suitable for tests. Values can be overridden from the
//! environment with the `HTTPTAP_` prefix, e.g. `HTTPTAP_UNMATCHED_POLICY=reject`.

use crate::utils::errors::Result;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment prefix read by [`InterceptorConfig::load`]
pub const ENV_PREFIX: &str = "HTTPTAP";

/// What to do with a request that has no registered expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Answer with a synthesized `404 Not Found` and log the request
    #[default]
    NotFound,

    /// Log the request, then fail the call with `TapError::UnregisteredRoute`
    Reject,
}

/// Configuration for an [`Interceptor`](crate::Interceptor)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Policy for requests without an expectation
    pub unmatched_policy: UnmatchedPolicy,

    /// Log the headers of every intercepted request at debug level
    pub log_requests: bool,

    /// Maximum body size written by the exporter (bytes)
    pub max_export_body_size: usize,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            unmatched_policy: UnmatchedPolicy::NotFound,
            log_requests: false,
            max_export_body_size: 10_000, // 10KB
        }
    }
}

impl InterceptorConfig {
    /// Strict configuration: unregistered routes fail the call
    pub fn strict() -> Self {
        Self {
            unmatched_policy: UnmatchedPolicy::Reject,
            ..Self::default()
        }
    }

    /// Load configuration from `HTTPTAP_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_source(source: Environment) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        debug!("Loaded interceptor config: {:?}", config);
        Ok(config)
    }
}
