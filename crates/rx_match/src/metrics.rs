// Metrics hooks for the `rx_match` crate.
//
// Callers install a global `ReconcileMetrics` implementation via
// [`set_reconcile_metrics`]; the engine then reports per-comparison latency
// and outcomes for every `compare` and `matches_record` call. This keeps
// instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::VerdictTier;

/// Metrics observer for reconciliation operations.
pub trait ReconcileMetrics: Send + Sync {
    /// Record the outcome of one scoring comparison.
    ///
    /// `tier` is the decision-ladder rung that produced the verdict,
    /// `confidence` its 0-100 score, and `latency` the wall-clock duration
    /// of the call.
    fn record_compare(&self, tier: VerdictTier, confidence: u8, latency: Duration);

    /// Record the outcome of one acceptance-gate evaluation.
    fn record_gate(&self, accepted: bool, latency: Duration);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn ReconcileMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn ReconcileMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn ReconcileMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global reconciliation metrics recorder.
///
/// Typically called once during service startup so every comparison shares
/// the same metrics backend.
pub fn set_reconcile_metrics(recorder: Option<Arc<dyn ReconcileMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("reconcile metrics lock poisoned");
    *guard = recorder;
}
