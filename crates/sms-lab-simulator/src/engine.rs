use sms_lab_abstract::{ReportSink, RunResult, SimConfig};
use std::sync::Arc;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::counters::Aggregator;
use crate::error::SimError;
use crate::latency::{RandomLatencyModel, stream_rng};
use crate::monitor::ProgressMonitor;
use crate::producer::Producer;
use crate::queue::MessageQueue;
use crate::sender::{SenderPool, SenderWorker};
use crate::sink::TracingSink;

// RNG stream ids: 0 for the producer, then two per worker.
const PRODUCER_STREAM: u64 = 0;

fn latency_stream(worker: usize) -> u64 {
    2 * worker as u64 + 1
}

fn outcome_stream(worker: usize) -> u64 {
    2 * worker as u64 + 2
}

fn task_failed(task: &'static str) -> impl FnOnce(JoinError) -> SimError {
    move |source| SimError::TaskFailed { task, source }
}

/// Runs one producer, `sender_count` senders and a progress monitor to
/// completion.
pub struct Simulator {
    config: SimConfig,
    sink: Arc<dyn ReportSink>,
}

impl Simulator {
    /// Fails fast on an invalid config; nothing is spawned.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            sink: Arc::new(TracingSink),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Start every task, wait for all of them, and return the final counters.
    ///
    /// Tasks are started in no particular order relative to each other;
    /// senders that find the queue empty simply wait.
    pub async fn run(&self) -> Result<RunResult, SimError> {
        let config = &self.config;
        let started = Instant::now();
        info!(
            messages = config.message_count,
            senders = config.sender_count,
            mean_secs = config.mean_processing_time,
            error_rate = config.error_rate,
            "simulation starting"
        );

        let queue = Arc::new(MessageQueue::new());
        let (aggregator, outcomes, progress) = Aggregator::new();

        let workers = (0..config.sender_count)
            .map(|id| {
                let latency = RandomLatencyModel::new(
                    config.mean_processing_time,
                    config.latency_spread,
                    stream_rng(config.seed, latency_stream(id)),
                )?;
                Ok::<_, SimError>(SenderWorker::new(
                    id,
                    latency,
                    config.error_rate,
                    stream_rng(config.seed, outcome_stream(id)),
                    queue.clone(),
                    outcomes.clone(),
                    progress.clone(),
                    config.message_count,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        // Only the workers may keep the aggregator alive.
        drop(outcomes);

        let monitor = ProgressMonitor::new(
            config.report_interval(),
            config.message_count,
            progress,
        )
        .started_at(started);
        let producer = Producer::new(
            config.message_count,
            config.payload_len,
            stream_rng(config.seed, PRODUCER_STREAM),
        );

        let aggregator = tokio::spawn(aggregator.run());
        let pool = SenderPool::spawn(workers);
        let producer = tokio::spawn({
            let queue = queue.clone();
            async move { producer.produce(&queue) }
        });
        let monitor = tokio::spawn({
            let sink = self.sink.clone();
            async move { monitor.run(&sink).await }
        });
        debug!(senders = pool.len(), "all tasks spawned");

        let produced = producer.await.map_err(task_failed("producer"))?;
        let worker_stats = pool.join().await.map_err(task_failed("sender"))?;
        let counters = aggregator.await.map_err(task_failed("aggregator"))?;
        let reports = monitor.await.map_err(task_failed("monitor"))?;

        for stats in &worker_stats {
            debug!(
                worker = stats.id,
                processed = stats.processed,
                failed = stats.failed,
                "sender summary"
            );
        }

        let result = RunResult {
            sent: counters.sent,
            failed: counters.failed,
            total_processing_time: counters.total_processing_time,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            produced,
            sent = result.sent,
            failed = result.failed,
            reports,
            elapsed_secs = result.elapsed_secs,
            "simulation complete"
        );
        Ok(result)
    }
}

/// Validate `config`, run it to completion, and stream progress to `sink`.
pub async fn run_simulation(
    config: SimConfig,
    sink: Arc<dyn ReportSink>,
) -> Result<RunResult, SimError> {
    Simulator::new(config)?.with_sink(sink).run().await
}
