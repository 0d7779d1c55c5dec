use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Standard deviation of the send latency, in seconds.
pub const DEFAULT_LATENCY_SPREAD: f64 = 0.05;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("message_count must be greater than 0")]
    ZeroMessages,
    #[error("sender_count must be greater than 0")]
    ZeroSenders,
    #[error("mean_processing_time must be a positive number of seconds, got {0}")]
    NonPositiveMean(f64),
    #[error("latency_spread must be a finite, non-negative number of seconds, got {0}")]
    InvalidSpread(f64),
    #[error("error_rate must be in [0.0, 1.0), got {0}")]
    ErrorRateOutOfRange(f64),
    #[error("report_interval must be a positive number of seconds, got {0}")]
    ZeroInterval(f64),
}

/// Parameters of a single simulation run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Number of messages the producer generates.
    pub message_count: u64,
    /// Number of concurrent sender tasks.
    pub sender_count: usize,
    /// Mean of the send latency, in seconds.
    pub mean_processing_time: f64,
    /// Standard deviation of the send latency, in seconds. Not exposed on the CLI.
    pub latency_spread: f64,
    /// Probability that a processed message is marked failed.
    pub error_rate: f64,
    /// Seconds between two progress reports.
    pub report_interval: f64,
    /// Length of the generated alphanumeric payloads.
    pub payload_len: usize,
    /// Seed for every RNG in the run. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            message_count: 1000,
            sender_count: 4,
            mean_processing_time: 0.1,
            latency_spread: DEFAULT_LATENCY_SPREAD,
            error_rate: 0.0,
            report_interval: 1.0,
            payload_len: 100,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_count == 0 {
            return Err(ConfigError::ZeroMessages);
        }
        if self.sender_count == 0 {
            return Err(ConfigError::ZeroSenders);
        }
        if !(self.mean_processing_time.is_finite() && self.mean_processing_time > 0.0) {
            return Err(ConfigError::NonPositiveMean(self.mean_processing_time));
        }
        if !(self.latency_spread.is_finite() && self.latency_spread >= 0.0) {
            return Err(ConfigError::InvalidSpread(self.latency_spread));
        }
        if !(0.0..1.0).contains(&self.error_rate) {
            return Err(ConfigError::ErrorRateOutOfRange(self.error_rate));
        }
        if !(self.report_interval.is_finite() && self.report_interval > 0.0) {
            return Err(ConfigError::ZeroInterval(self.report_interval));
        }
        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs_f64(self.report_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.message_count, 1000);
        assert_eq!(config.latency_spread, DEFAULT_LATENCY_SPREAD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = SimConfig::default();

        let cases = [
            (
                SimConfig {
                    message_count: 0,
                    ..base.clone()
                },
                ConfigError::ZeroMessages,
            ),
            (
                SimConfig {
                    sender_count: 0,
                    ..base.clone()
                },
                ConfigError::ZeroSenders,
            ),
            (
                SimConfig {
                    mean_processing_time: 0.0,
                    ..base.clone()
                },
                ConfigError::NonPositiveMean(0.0),
            ),
            (
                SimConfig {
                    latency_spread: -0.1,
                    ..base.clone()
                },
                ConfigError::InvalidSpread(-0.1),
            ),
            (
                SimConfig {
                    error_rate: 1.0,
                    ..base.clone()
                },
                ConfigError::ErrorRateOutOfRange(1.0),
            ),
            (
                SimConfig {
                    report_interval: 0.0,
                    ..base.clone()
                },
                ConfigError::ZeroInterval(0.0),
            ),
        ];

        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimConfig = toml::from_str("message_count = 5\nerror_rate = 0.25").unwrap();
        assert_eq!(config.message_count, 5);
        assert_eq!(config.error_rate, 0.25);
        assert_eq!(config.sender_count, SimConfig::default().sender_count);
        assert_eq!(config.seed, None);
    }
}
