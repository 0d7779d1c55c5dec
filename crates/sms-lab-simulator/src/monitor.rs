use sms_lab_abstract::{ProgressReport, ReportSink};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::counters::Counters;

/// Periodically turns the latest counter snapshot into a [`ProgressReport`].
pub struct ProgressMonitor {
    interval: Duration,
    target: u64,
    progress: watch::Receiver<Counters>,
    started: Instant,
}

impl ProgressMonitor {
    pub fn new(interval: Duration, target: u64, progress: watch::Receiver<Counters>) -> Self {
        Self {
            interval,
            target,
            progress,
            started: Instant::now(),
        }
    }

    /// Measure `elapsed_secs` from `started` instead of construction time.
    pub fn started_at(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Report once per interval until a report shows the run complete.
    /// The first report comes after one full interval. Returns the number
    /// of reports emitted.
    pub async fn run<S: ReportSink + ?Sized>(self, sink: &S) -> usize {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reports = 0;

        loop {
            ticker.tick().await;

            let snapshot = *self.progress.borrow();
            let report = ProgressReport::new(
                snapshot.sent,
                snapshot.failed,
                snapshot.total_processing_time,
                self.started.elapsed().as_secs_f64(),
            );
            sink.report(&report);
            reports += 1;

            if snapshot.is_complete(self.target) {
                break;
            }
        }

        sink.finish();
        debug!(reports, "monitor finished");
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;

    #[tokio::test(start_paused = true)]
    async fn test_complete_run_reports_once_then_stops() {
        let (_tx, rx) = watch::channel(Counters {
            sent: 5,
            failed: 0,
            total_processing_time: 0.0,
        });
        let sink = CollectingSink::new();
        let start = Instant::now();

        let reports = ProgressMonitor::new(Duration::from_millis(100), 5, rx)
            .run(&sink)
            .await;

        assert_eq!(reports, 1);
        // no report at time zero
        assert!(start.elapsed() >= Duration::from_millis(100));

        let collected = sink.reports();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].average_processing_time, 0.0);
        assert_eq!(
            collected[0].to_string(),
            "Messages Successfully Sent: 5, Messages Failed: 0, Average Time per Message: 0.0000 seconds"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_every_interval_until_complete() {
        let (tx, rx) = watch::channel(Counters::default());
        let sink = CollectingSink::new();

        let monitor = tokio::spawn({
            let sink = sink.clone();
            async move {
                ProgressMonitor::new(Duration::from_secs(1), 4, rx)
                    .run(&sink)
                    .await
            }
        });

        for sent in 1..=4u64 {
            // publish halfway between two ticks
            tokio::time::sleep(Duration::from_millis(if sent == 1 { 1500 } else { 1000 })).await;
            tx.send_replace(Counters {
                sent,
                failed: sent / 2,
                total_processing_time: sent as f64 * 0.1,
            });
        }

        assert_eq!(monitor.await.unwrap(), 5);
        let sent: Vec<u64> = sink.reports().iter().map(|r| r.sent).collect();
        assert_eq!(sent, vec![0, 1, 2, 3, 4]);

        let last = sink.reports().pop().unwrap();
        assert_eq!(last.successfully_sent, 2);
        assert_eq!(last.failed, 2);
        assert!((last.average_processing_time - 0.1).abs() < 1e-9);
    }
}
