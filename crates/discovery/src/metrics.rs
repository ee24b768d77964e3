// Metrics hooks for the `discovery` crate.
//
// Install a global `DiscoveryMetrics` implementation via
// [`set_discovery_metrics`]; `OperationDiscoverer` reports one event per
// reachability request.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::Completion;

/// Metrics observer for reachability discovery.
pub trait DiscoveryMetrics: Send + Sync {
    fn record_discovery(
        &self,
        latency: Duration,
        passes: usize,
        operations: usize,
        completion: &Completion,
    );

    fn record_failure(&self, _latency: Duration, _pass: Option<usize>) {}
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn DiscoveryMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn DiscoveryMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn DiscoveryMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global discovery metrics recorder.
pub fn set_discovery_metrics(recorder: Option<Arc<dyn DiscoveryMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
