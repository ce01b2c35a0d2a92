//! Pipeline configuration.

use conduit_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Order in which outgoing hooks run.
///
/// Incoming hooks always run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookOrder {
    /// Same order as registration.
    #[default]
    Registration,
    /// Last registered runs first, so outgoing hooks unwind the incoming ones.
    Reverse,
}

/// What the runner does once a hook sets `error` on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Keep running the remaining hooks so they still observe the message.
    #[default]
    Continue,
    /// Skip the remaining hooks.
    ShortCircuit,
}

/// Settings for a [`Pipeline`](super::Pipeline).
///
/// # Example
///
/// ```rust
/// use conduit_std::{ErrorPolicy, HookOrder, PipelineConfig};
///
/// let config = PipelineConfig::from_json(
///     r#"{ "outgoing_order": "reverse", "on_error": "short_circuit", "run_timeout_ms": 500 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.outgoing_order, HookOrder::Reverse);
/// assert_eq!(config.on_error, ErrorPolicy::ShortCircuit);
/// assert_eq!(config.run_timeout(), Some(std::time::Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Outgoing hook order.
    pub outgoing_order: HookOrder,
    /// Behavior after a hook rejects the message.
    pub on_error: ErrorPolicy,
    /// Upper bound for a single run, in milliseconds. `None` waits forever.
    pub run_timeout_ms: Option<u64>,
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "run_timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// The run timeout as a [`Duration`].
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    /// Set the outgoing hook order.
    pub fn with_outgoing_order(mut self, order: HookOrder) -> Self {
        self.outgoing_order = order;
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Set the run timeout.
    pub fn with_run_timeout(mut self, limit: Duration) -> Self {
        self.run_timeout_ms = Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.outgoing_order, HookOrder::Registration);
        assert_eq!(config.on_error, ErrorPolicy::Continue);
        assert_eq!(config.run_timeout(), None);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = PipelineConfig::from_json(r#"{ "run_timeout_ms": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "run_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = PipelineConfig::from_json(r#"{ "outgoing": "reverse" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::default()
            .with_outgoing_order(HookOrder::Reverse)
            .with_error_policy(ErrorPolicy::ShortCircuit)
            .with_run_timeout(Duration::from_secs(2));
        assert_eq!(config.run_timeout_ms, Some(2000));
        assert_eq!(config.outgoing_order, HookOrder::Reverse);
    }
}
