//! Service configuration and the per-call optimize context.

use std::net::SocketAddr;
use uuid::Uuid;

use crate::error::{RosterError, RosterResult};

/// Default listen address (same port as the other quickstart servers).
pub const DEFAULT_BIND: &str = "0.0.0.0:7860";

/// Upper bound on a request's `timeout_seconds`.
pub const DEFAULT_MAX_TIMEOUT_SECS: u64 = 300;

/// Cap on the relaxed solve budget.
pub const DEFAULT_RELAXED_TIMEOUT_SECS: u64 = 10;

/// Process-level settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub max_timeout_secs: u64,
    pub relaxed_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 7860)),
            max_timeout_secs: DEFAULT_MAX_TIMEOUT_SECS,
            relaxed_timeout_secs: DEFAULT_RELAXED_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Reads `ROSTER_BIND`, `ROSTER_MAX_TIMEOUT_SECS` and
    /// `ROSTER_RELAXED_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> RosterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// ```
    /// use roster_optimizer::config::ServiceConfig;
    ///
    /// let config = ServiceConfig::from_lookup(|key| match key {
    ///     "ROSTER_MAX_TIMEOUT_SECS" => Some("60".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.max_timeout_secs, 60);
    /// assert_eq!(config.relaxed_timeout_secs, 10);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RosterResult<Self> {
        let bind = lookup("ROSTER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse::<SocketAddr>()
            .map_err(|e| RosterError::Config(format!("ROSTER_BIND={bind:?}: {e}")))?;

        let max_timeout_secs = parse_secs(&lookup, "ROSTER_MAX_TIMEOUT_SECS", DEFAULT_MAX_TIMEOUT_SECS)?;
        let relaxed_timeout_secs =
            parse_secs(&lookup, "ROSTER_RELAXED_TIMEOUT_SECS", DEFAULT_RELAXED_TIMEOUT_SECS)?;

        Ok(Self {
            bind,
            max_timeout_secs,
            relaxed_timeout_secs,
        })
    }

    /// Context for one optimize call.
    pub fn context(&self, request_id: Uuid) -> OptimizeContext {
        OptimizeContext {
            request_id,
            max_timeout_secs: self.max_timeout_secs,
            relaxed_timeout_secs: self.relaxed_timeout_secs,
        }
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> RosterResult<u64> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(RosterError::Config(format!("{key}={raw:?}: expected a positive integer"))),
        },
    }
}

/// Explicit per-call context passed into [`optimize`](crate::optimize::optimize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeContext {
    /// Correlates log lines of one call.
    pub request_id: Uuid,
    pub max_timeout_secs: u64,
    pub relaxed_timeout_secs: u64,
}

impl Default for OptimizeContext {
    fn default() -> Self {
        ServiceConfig::default().context(Uuid::new_v4())
    }
}
