//! C9: StatusStreamProvider — a lazy, monotone, deduplicated sequence of
//! request-status transitions for a commitment (spec.md §4.9).
//!
//! The indexer backend itself is an external collaborator (spec.md §1
//! Non-goal); this module only owns the poll loop, the total-order/dedup
//! guarantee, and cancellation.

use super::error::StatusStreamError;
use super::model::{RequestStatus, RequestStatusWithMetadata};
use crate::metrics;
use alloy::primitives::B256;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One poll against the indexer for a commitment's current status.
///
/// Distinct from [`super::external::StatusStreamProvider`] (which exposes
/// a ready-made `BoxStream`): this trait models a single-shot query so the
/// poll loop here owns the interval, dedup, and cancellation itself.
#[async_trait]
pub trait StatusPoller: Send + Sync {
    async fn poll_status(&self, commitment: B256) -> eyre::Result<Option<RequestStatusWithMetadata>>;
}

#[async_trait]
impl<P: StatusPoller + ?Sized> StatusPoller for std::sync::Arc<P> {
    async fn poll_status(&self, commitment: B256) -> eyre::Result<Option<RequestStatusWithMetadata>> {
        (**self).poll_status(commitment).await
    }
}

fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Source => "source",
        RequestStatus::SourceFinalized => "source-finalized",
        RequestStatus::HyperbridgeDelivered => "hyperbridge-delivered",
        RequestStatus::HyperbridgeFinalized => "hyperbridge-finalized",
        RequestStatus::Destination => "destination",
        RequestStatus::TimedOut => "timed-out",
        RequestStatus::HyperbridgeTimedOut => "hyperbridge-timed-out",
    }
}

/// Default poll interval (spec.md §4.9).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

pub struct StatusStream<P: StatusPoller> {
    poller: P,
    poll_interval_ms: u64,
}

impl<P: StatusPoller> StatusStream<P> {
    pub fn new(poller: P) -> Self {
        Self { poller, poll_interval_ms: DEFAULT_POLL_INTERVAL_MS }
    }

    pub fn with_poll_interval_ms(poller: P, poll_interval_ms: u64) -> Self {
        Self { poller, poll_interval_ms }
    }

    /// Runs the poll loop for `commitment`, forwarding strictly-increasing,
    /// de-duplicated statuses to `out` until a terminal status is reached,
    /// the poller errors fatally, or `cancel` fires.
    ///
    /// The provider releases its poll loop promptly on cancellation: the
    /// `select!` below observes `cancel` at every suspension point (the
    /// sleep and the send).
    pub async fn run(&self, commitment: B256, out: mpsc::Sender<RequestStatusWithMetadata>, cancel: CancellationToken) {
        let mut last_emitted: Option<RequestStatus> = None;
        let interval = tokio::time::Duration::from_millis(self.poll_interval_ms);

        loop {
            let poll_result = self.poller.poll_status(commitment).await;

            match poll_result {
                Ok(Some(update)) => {
                    let is_duplicate = last_emitted == Some(update.status);
                    let is_regression = last_emitted.is_some_and(|prev| update.status < prev);

                    if is_regression {
                        warn!(%commitment, prev = ?last_emitted, next = ?update.status, "status stream observed a regression; ignoring");
                    } else if !is_duplicate {
                        let terminal = update.status.is_terminal();
                        last_emitted = Some(update.status);
                        metrics::record_status_stream_event(status_label(update.status));

                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return,
                            result = out.send(update) => {
                                if result.is_err() {
                                    return;
                                }
                            }
                        }

                        if terminal {
                            debug!(%commitment, "status stream reached terminal status");
                            return;
                        }
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    let error = StatusStreamError::PollFailed(error.to_string());
                    warn!(%commitment, %error, "status poll failed, retrying next interval");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::BlockMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn meta() -> BlockMetadata {
        BlockMetadata { block_hash: B256::ZERO, block_number: 1, tx_hash: B256::ZERO, calldata: None }
    }

    struct ScriptedPoller {
        responses: Mutex<Vec<RequestStatus>>,
        index: AtomicUsize,
    }

    #[async_trait]
    impl StatusPoller for ScriptedPoller {
        async fn poll_status(&self, _commitment: B256) -> eyre::Result<Option<RequestStatusWithMetadata>> {
            let idx = self.index.fetch_add(1, Ordering::SeqCst);
            let responses = self.responses.lock().unwrap();
            Ok(responses.get(idx).map(|status| RequestStatusWithMetadata { status: *status, meta: meta() }))
        }
    }

    #[tokio::test]
    async fn emits_strictly_increasing_sequence_and_terminates() {
        let poller = ScriptedPoller {
            responses: Mutex::new(vec![
                RequestStatus::Source,
                RequestStatus::Source,
                RequestStatus::SourceFinalized,
                RequestStatus::HyperbridgeDelivered,
                RequestStatus::HyperbridgeFinalized,
                RequestStatus::Destination,
            ]),
            index: AtomicUsize::new(0),
        };
        let stream = StatusStream::with_poll_interval_ms(poller, 1);
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        tokio::time::timeout(std::time::Duration::from_secs(2), stream.run(B256::ZERO, tx, cancel))
            .await
            .expect("stream did not terminate");

        let mut seen = Vec::new();
        while let Ok(update) = rx.try_recv() {
            seen.push(update.status);
        }

        assert_eq!(
            seen,
            vec![
                RequestStatus::Source,
                RequestStatus::SourceFinalized,
                RequestStatus::HyperbridgeDelivered,
                RequestStatus::HyperbridgeFinalized,
                RequestStatus::Destination,
            ]
        );
    }

    #[tokio::test]
    async fn cancellation_releases_the_loop_promptly() {
        let poller = ScriptedPoller { responses: Mutex::new(vec![RequestStatus::Source]), index: AtomicUsize::new(0) };
        let stream = StatusStream::with_poll_interval_ms(poller, 60_000);
        let (tx, _rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_millis(500), stream.run(B256::ZERO, tx, cancel))
            .await
            .expect("run() did not observe cancellation promptly");
    }
}
