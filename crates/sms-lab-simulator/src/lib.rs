pub mod counters;
pub mod engine;
pub mod error;
pub mod latency;
pub mod monitor;
pub mod producer;
pub mod queue;
pub mod sender;
pub mod sink;
pub mod trace;

#[cfg(feature = "tui")]
pub mod tui;

pub use counters::{Aggregator, Counters, OutcomeSender, SendOutcome};
pub use engine::{Simulator, run_simulation};
pub use error::SimError;
pub use latency::{FixedLatency, LatencyModel, RandomLatencyModel};
pub use monitor::ProgressMonitor;
pub use producer::Producer;
pub use queue::{Message, MessageQueue};
pub use sender::{SenderPool, SenderWorker, WorkerStats};
pub use sink::{ChannelSink, CollectingSink, ConsoleSink, TracingSink};
pub use trace::SimulationReport;
