use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Aggregate send statistics. Published as a whole, so a reader never sees
/// `sent` without the matching `total_processing_time` contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Counters {
    pub sent: u64,
    pub failed: u64,
    /// Seconds.
    pub total_processing_time: f64,
}

impl Counters {
    pub fn record(&mut self, outcome: SendOutcome) {
        self.sent += 1;
        if outcome.failed {
            self.failed += 1;
        }
        self.total_processing_time += outcome.duration.as_secs_f64();
    }

    pub fn average_processing_time(&self) -> f64 {
        if self.sent > 0 {
            self.total_processing_time / self.sent as f64
        } else {
            0.0
        }
    }

    pub fn is_complete(&self, target: u64) -> bool {
        self.sent >= target
    }
}

/// Result of one simulated send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendOutcome {
    pub duration: Duration,
    pub failed: bool,
}

/// Sender half handed to each worker.
#[derive(Debug, Clone)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<SendOutcome>,
}

impl OutcomeSender {
    pub fn record(&self, outcome: SendOutcome) {
        // The aggregator outlives every sender, so a closed channel only
        // happens while the run is being torn down.
        if self.tx.send(outcome).is_err() {
            debug!("aggregator gone, dropping outcome");
        }
    }
}

/// Single owner of the run's [`Counters`].
///
/// Senders push outcomes over an mpsc channel; after each one the aggregator
/// publishes a fresh snapshot on a `watch` channel. Readers (the monitor, and
/// workers waiting for completion) only ever see whole snapshots.
pub struct Aggregator {
    outcome_rx: mpsc::UnboundedReceiver<SendOutcome>,
    snapshot_tx: watch::Sender<Counters>,
    counters: Counters,
}

impl Aggregator {
    pub fn new() -> (Self, OutcomeSender, watch::Receiver<Counters>) {
        Self::starting_from(Counters::default())
    }

    pub fn starting_from(
        counters: Counters,
    ) -> (Self, OutcomeSender, watch::Receiver<Counters>) {
        let (tx, outcome_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(counters);
        let aggregator = Self {
            outcome_rx,
            snapshot_tx,
            counters,
        };
        (aggregator, OutcomeSender { tx }, snapshot_rx)
    }

    /// Fold outcomes until every [`OutcomeSender`] is dropped, then return
    /// the final counters.
    pub async fn run(mut self) -> Counters {
        debug!("aggregator started");
        while let Some(outcome) = self.outcome_rx.recv().await {
            self.counters.record(outcome);
            // send_replace keeps publishing even when no receiver is left.
            self.snapshot_tx.send_replace(self.counters);
        }
        info!(
            sent = self.counters.sent,
            failed = self.counters.failed,
            "aggregator finished"
        );
        self.counters
    }
}
