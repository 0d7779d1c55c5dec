pub mod config;
pub mod interface;
pub mod report;
pub mod scenario;

pub use interface::{FnSink, ReportSink};
pub use report::{ProgressReport, RunResult};

pub use config::{ConfigError, DEFAULT_LATENCY_SPREAD, SimConfig};
pub use scenario::{Scenario, SimConfigOverride};
