use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use crate::RetrievalError;

/// Observer for retrieval calls.
pub trait RetrievalMetrics: Send + Sync {
    /// `result` is the hit count on success.
    fn record_retrieval(&self, latency: Duration, result: Result<usize, &RetrievalError>);
}

/// Install or clear the process-wide retrieval metrics recorder.
pub fn set_retrieval_metrics(recorder: Option<Arc<dyn RetrievalMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn RetrievalMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn RetrievalMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn RetrievalMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn RetrievalMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record(self, result: Result<usize, &RetrievalError>) {
        self.recorder.record_retrieval(self.start.elapsed(), result);
    }
}
