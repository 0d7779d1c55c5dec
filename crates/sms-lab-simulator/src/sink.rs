use sms_lab_abstract::{ProgressReport, ReportSink};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;

/// Prints each report as one line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn report(&self, report: &ProgressReport) {
        println!("{report}");
    }
}

/// Emits each report as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: &ProgressReport) {
        info!(
            successfully_sent = report.successfully_sent,
            failed = report.failed,
            average_secs = report.average_processing_time,
            elapsed_secs = report.elapsed_secs,
            "progress"
        );
    }
}

/// Keeps every report in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    reports: Arc<Mutex<Vec<ProgressReport>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ProgressReport> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, report: &ProgressReport) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report.clone());
    }
}

/// Forwards reports to an unbounded channel, e.g. for a UI thread.
/// The channel closes once the sink is dropped at the end of a run.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressReport>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ReportSink for ChannelSink {
    fn report(&self, report: &ProgressReport) {
        // A closed receiver just means nobody is watching any more.
        let _ = self.tx.send(report.clone());
    }
}
