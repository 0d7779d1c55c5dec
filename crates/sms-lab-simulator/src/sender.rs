use rand::Rng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::counters::{Counters, OutcomeSender, SendOutcome};
use crate::latency::LatencyModel;
use crate::queue::MessageQueue;

/// Per-worker tallies, returned when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: usize,
    pub processed: u64,
    pub failed: u64,
}

/// One sender: drains the queue until the whole run is complete.
pub struct SenderWorker<L> {
    id: usize,
    latency: L,
    error_rate: f64,
    rng: StdRng,
    queue: Arc<MessageQueue>,
    outcomes: OutcomeSender,
    progress: watch::Receiver<Counters>,
    target: u64,
}

impl<L: LatencyModel> SenderWorker<L> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        latency: L,
        error_rate: f64,
        rng: StdRng,
        queue: Arc<MessageQueue>,
        outcomes: OutcomeSender,
        progress: watch::Receiver<Counters>,
        target: u64,
    ) -> Self {
        Self {
            id,
            latency,
            error_rate,
            rng,
            queue,
            outcomes,
            progress,
            target,
        }
    }

    /// Process messages until `target` sends have been recorded run-wide.
    ///
    /// An empty queue does not end the worker: another message may still be
    /// on its way from the producer, or another worker may still be sleeping
    /// on the last one. The worker parks until either a message is appended
    /// or the aggregator publishes a complete snapshot.
    pub async fn run(mut self) -> WorkerStats {
        let mut stats = WorkerStats {
            id: self.id,
            ..Default::default()
        };
        let target = self.target;
        debug!(worker = self.id, "sender started");

        loop {
            let message = tokio::select! {
                biased;
                message = self.queue.pop() => message,
                // Err means the aggregator is gone, which only happens after
                // every sender has already exited.
                _ = self.progress.wait_for(|c| c.is_complete(target)) => break,
            };

            // No guard is held here; the sleep only suspends this worker.
            let duration = self.latency.sample();
            tokio::time::sleep(duration).await;

            let failed = self.rng.random::<f64>() < self.error_rate;
            trace!(
                worker = self.id,
                message = message.id,
                ?duration,
                failed,
                "message processed"
            );

            stats.processed += 1;
            if failed {
                stats.failed += 1;
            }
            self.outcomes.record(SendOutcome { duration, failed });
        }

        debug!(
            worker = self.id,
            processed = stats.processed,
            failed = stats.failed,
            "sender finished"
        );
        stats
    }
}

/// Spawns and tracks `n` sender workers.
pub struct SenderPool {
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl SenderPool {
    pub fn spawn<L, I>(workers: I) -> Self
    where
        L: LatencyModel + 'static,
        I: IntoIterator<Item = SenderWorker<L>>,
    {
        let handles = workers
            .into_iter()
            .map(|worker| tokio::spawn(worker.run()))
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    pub async fn join(self) -> Result<Vec<WorkerStats>, tokio::task::JoinError> {
        let mut stats = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            stats.push(handle.await?);
        }
        Ok(stats)
    }
}
