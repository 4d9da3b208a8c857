use core::time::Duration;
use eyre::{Result, WrapErr};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::LazyLock;

/// Installs the global Prometheus recorder and registers this crate's
/// metric descriptions. Call once, at process start.
pub fn install_recorder() -> Result<()> {
    PrometheusBuilder::new().install().wrap_err("failed to install Prometheus metrics recorder")?;
    LazyLock::force(&DESCRIPTIONS);
    Ok(())
}

// Metric names
const UPTIME_SECONDS: &str = "intent_filler.uptime_seconds";
const ORDERS_ADMITTED: &str = "intent_filler.orders_admitted";
const ORDERS_FILLED: &str = "intent_filler.orders_filled";
const ORDERS_REJECTED: &str = "intent_filler.orders_rejected";
const ORDERS_EXPIRED: &str = "intent_filler.orders_expired";
const FILL_RETRIES: &str = "intent_filler.fill_retries";
const PENDING_QUEUE_DEPTH: &str = "intent_filler.pending_queue_depth";
const FILL_DURATION_SECONDS: &str = "intent_filler.fill_duration_seconds";
const CANCELLATION_PHASE_TRANSITIONS: &str = "intent_filler.cancellation_phase_transitions";
const STATUS_STREAM_EVENTS: &str = "intent_filler.status_stream_events";

/// Force evaluation to register all metric descriptions with the exporter.
pub(crate) static DESCRIPTIONS: LazyLock<()> = LazyLock::new(|| {
    describe_gauge!(UPTIME_SECONDS, "Seconds since the intent-filler process started");
    describe_counter!(ORDERS_ADMITTED, "Orders admitted to the scheduler's Pending queue");
    describe_counter!(ORDERS_FILLED, "Orders that reached the Filled terminal state");
    describe_counter!(
        ORDERS_REJECTED,
        "Orders rejected (label: reason = shape-mismatch / unsupported-token / decimal-mismatch / \
        insufficient-balance / already-filled)"
    );
    describe_counter!(ORDERS_EXPIRED, "Orders dropped from the Pending queue after exhausting rechecks");
    describe_counter!(FILL_RETRIES, "Fill attempts re-queued after a transient failure");
    describe_gauge!(PENDING_QUEUE_DEPTH, "Current depth of the scheduler's Pending queue");
    describe_histogram!(FILL_DURATION_SECONDS, "Wall-clock duration of a fill execution");
    describe_counter!(CANCELLATION_PHASE_TRANSITIONS, "Canceller state machine phase transitions (label: phase)");
    describe_counter!(STATUS_STREAM_EVENTS, "Status-stream events emitted (label: status)");
});

pub(crate) enum OrderRejectedReason {
    ShapeMismatch,
    UnsupportedToken,
    DecimalMismatch,
    InsufficientBalance,
    AlreadyFilled,
    /// `can_fill`'s precondition gate rejected the order at execution time;
    /// the specific cause is in the `ExecutionResult.error` string.
    FillRejected,
}

impl OrderRejectedReason {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            OrderRejectedReason::ShapeMismatch => "shape-mismatch",
            OrderRejectedReason::UnsupportedToken => "unsupported-token",
            OrderRejectedReason::DecimalMismatch => "decimal-mismatch",
            OrderRejectedReason::InsufficientBalance => "insufficient-balance",
            OrderRejectedReason::AlreadyFilled => "already-filled",
            OrderRejectedReason::FillRejected => "fill-rejected",
        }
    }
}

/// Record uptime gauge.
pub(crate) fn record_uptime(elapsed: Duration) {
    gauge!(UPTIME_SECONDS).set(elapsed.as_secs_f64());
}

/// Record an order admitted into the Pending queue.
pub(crate) fn record_order_admitted() {
    counter!(ORDERS_ADMITTED).increment(1);
}

/// Record an order reaching the Filled terminal state.
pub(crate) fn record_order_filled() {
    counter!(ORDERS_FILLED).increment(1);
}

/// Record an order rejected for the given reason.
pub(crate) fn record_order_rejected(reason: OrderRejectedReason) {
    counter!(ORDERS_REJECTED, "reason" => reason.as_str()).increment(1);
}

/// Record an order expiring out of the Pending queue.
pub(crate) fn record_order_expired() {
    counter!(ORDERS_EXPIRED).increment(1);
}

/// Record a fill attempt being re-queued after a transient failure.
pub(crate) fn record_fill_retry() {
    counter!(FILL_RETRIES).increment(1);
}

/// Record the current Pending queue depth.
pub(crate) fn record_pending_queue_depth(depth: usize) {
    gauge!(PENDING_QUEUE_DEPTH).set(depth as f64);
}

/// Record the duration of a fill execution.
pub(crate) fn record_fill_duration(elapsed: Duration) {
    histogram!(FILL_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

/// Record a canceller phase transition.
pub(crate) fn record_cancellation_phase_transition(phase: &str) {
    counter!(CANCELLATION_PHASE_TRANSITIONS, "phase" => phase.to_string()).increment(1);
}

/// Record a status-stream emission.
pub(crate) fn record_status_stream_event(status: &str) {
    counter!(STATUS_STREAM_EVENTS, "status" => status.to_string()).increment(1);
}
