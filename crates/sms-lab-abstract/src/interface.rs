use crate::report::ProgressReport;
use std::sync::Arc;

/// Destination for the progress monitor's periodic reports.
///
/// The monitor calls `report` from its own task, once per interval, so
/// implementations must be shareable across threads. Rendering should be cheap:
/// a slow sink delays the next tick but never stalls producers or senders.
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &ProgressReport);

    /// Called once after the final report of a run.
    fn finish(&self) {}
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn report(&self, report: &ProgressReport) {
        (**self).report(report);
    }

    fn finish(&self) {
        (**self).finish();
    }
}

/// Fan a report out to two sinks.
impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn report(&self, report: &ProgressReport) {
        self.0.report(report);
        self.1.report(report);
    }

    fn finish(&self) {
        self.0.finish();
        self.1.finish();
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> ReportSink for FnSink<F>
where
    F: Fn(&ProgressReport) + Send + Sync,
{
    fn report(&self, report: &ProgressReport) {
        (self.0)(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fan_out_reaches_both_sinks() {
        let left = AtomicUsize::new(0);
        let right = Mutex::new(Vec::new());
        let sink = (
            FnSink(|_: &ProgressReport| {
                left.fetch_add(1, Ordering::SeqCst);
            }),
            FnSink(|r: &ProgressReport| right.lock().unwrap().push(r.sent)),
        );

        sink.report(&ProgressReport::new(3, 1, 0.3, 1.0));
        sink.report(&ProgressReport::new(4, 1, 0.4, 2.0));

        assert_eq!(left.load(Ordering::SeqCst), 2);
        assert_eq!(*right.lock().unwrap(), vec![3, 4]);
    }
}
