//! Settings read by the request middleware on every call.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::config::observability::ObservabilityConfig;

static SLOW_REQUEST_THRESHOLD_MS: AtomicU64 = AtomicU64::new(1_000);
static ADOPT_REMOTE_PARENT: AtomicBool = AtomicBool::new(false);

pub(super) fn apply(config: &ObservabilityConfig) {
    SLOW_REQUEST_THRESHOLD_MS.store(config.slow_request_threshold_ms, Ordering::Relaxed);

    // A remote parent is meaningless when nothing is exported.
    ADOPT_REMOTE_PARENT.store(
        config.otel.enabled && config.otel.parent_propagation,
        Ordering::Relaxed,
    );
}

pub(super) fn slow_request_threshold_ms() -> u64 {
    SLOW_REQUEST_THRESHOLD_MS.load(Ordering::Relaxed)
}

pub(super) fn adopt_remote_parent() -> bool {
    ADOPT_REMOTE_PARENT.load(Ordering::Relaxed)
}
