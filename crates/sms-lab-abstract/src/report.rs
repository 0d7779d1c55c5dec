use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of periodic progress output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Messages processed so far, failed ones included.
    pub sent: u64,
    pub successfully_sent: u64,
    pub failed: u64,
    /// Mean simulated latency per processed message, in seconds. Zero before the first send.
    pub average_processing_time: f64,
    /// Seconds since the run started.
    pub elapsed_secs: f64,
}

impl ProgressReport {
    pub fn new(sent: u64, failed: u64, total_processing_time: f64, elapsed_secs: f64) -> Self {
        let average_processing_time = if sent > 0 {
            total_processing_time / sent as f64
        } else {
            0.0
        };
        Self {
            sent,
            successfully_sent: sent - failed,
            failed,
            average_processing_time,
            elapsed_secs,
        }
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Messages Successfully Sent: {}, Messages Failed: {}, Average Time per Message: {:.4} seconds",
            self.successfully_sent, self.failed, self.average_processing_time
        )
    }
}

/// Final counters of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub sent: u64,
    pub failed: u64,
    /// Sum of all simulated latencies, in seconds.
    pub total_processing_time: f64,
    /// Wall-clock duration of the run, in seconds.
    pub elapsed_secs: f64,
}

impl RunResult {
    pub fn successfully_sent(&self) -> u64 {
        self.sent - self.failed
    }

    pub fn average_processing_time(&self) -> f64 {
        if self.sent > 0 {
            self.total_processing_time / self.sent as f64
        } else {
            0.0
        }
    }
}
