use serde::Serialize;
use sms_lab_abstract::{ProgressReport, RunResult, SimConfig};

/// Everything worth keeping about a finished run, for `--trace-out`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub config: SimConfig,
    pub result: RunResult,
    pub average_processing_time: f64,
    pub progress: Vec<ProgressReport>,
}

impl SimulationReport {
    pub fn new(
        scenario: Option<String>,
        config: SimConfig,
        result: RunResult,
        progress: Vec<ProgressReport>,
    ) -> Self {
        Self {
            scenario,
            config,
            average_processing_time: result.average_processing_time(),
            result,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_serializes_result_and_progress() {
        let result = RunResult {
            sent: 4,
            failed: 1,
            total_processing_time: 0.4,
            elapsed_secs: 1.2,
        };
        let report = SimulationReport::new(
            Some("smoke".into()),
            SimConfig::default(),
            result,
            vec![ProgressReport::new(4, 1, 0.4, 1.0)],
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenario"], "smoke");
        assert_eq!(json["result"]["sent"], 4);
        assert_eq!(json["progress"][0]["successfully_sent"], 3);
        assert_eq!(json["config"]["message_count"], 1000);
        assert!((json["average_processing_time"].as_f64().unwrap() - 0.1).abs() < 1e-9);
    }
}
