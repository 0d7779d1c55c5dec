use crate::config::SimConfig;
use serde::{Deserialize, Serialize};

/// A named run description, usually loaded from a TOML file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Scenario {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub config: SimConfigOverride,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SimConfigOverride {
    pub message_count: Option<u64>,
    pub sender_count: Option<usize>,
    pub mean_processing_time: Option<f64>,
    pub latency_spread: Option<f64>,
    pub error_rate: Option<f64>,
    pub report_interval: Option<f64>,
    pub payload_len: Option<usize>,
    pub seed: Option<u64>,
}

impl SimConfigOverride {
    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(v) = self.message_count {
            config.message_count = v;
        }
        if let Some(v) = self.sender_count {
            config.sender_count = v;
        }
        if let Some(v) = self.mean_processing_time {
            config.mean_processing_time = v;
        }
        if let Some(v) = self.latency_spread {
            config.latency_spread = v;
        }
        if let Some(v) = self.error_rate {
            config.error_rate = v;
        }
        if let Some(v) = self.report_interval {
            config.report_interval = v;
        }
        if let Some(v) = self.payload_len {
            config.payload_len = v;
        }
        if let Some(v) = self.seed {
            config.seed = Some(v);
        }
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: SimConfigOverride) -> SimConfigOverride {
        SimConfigOverride {
            message_count: other.message_count.or(self.message_count),
            sender_count: other.sender_count.or(self.sender_count),
            mean_processing_time: other.mean_processing_time.or(self.mean_processing_time),
            latency_spread: other.latency_spread.or(self.latency_spread),
            error_rate: other.error_rate.or(self.error_rate),
            report_interval: other.report_interval.or(self.report_interval),
            payload_len: other.payload_len.or(self.payload_len),
            seed: other.seed.or(self.seed),
        }
    }
}
