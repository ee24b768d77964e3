// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`];
// `SubsumptionMatcher` then reports the latency and produced degree of every
// pairwise match. Instrumentation stays decoupled from any metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use lattice::IoMatchType;
use once_cell::sync::OnceCell;

/// Metrics observer for concept matches.
pub trait MatchMetrics: Send + Sync {
    /// Record one decided pair. `degree` is the produced match type; oracle
    /// failures are reported through [`MatchMetrics::record_unavailable`].
    fn record_match(&self, degree: IoMatchType, latency: Duration);

    fn record_unavailable(&self, _latency: Duration) {}
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
