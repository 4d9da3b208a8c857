//! C6: EventMonitor — converges recent orders from the indexer into an
//! event stream for the scheduler (spec.md §4.6).

use super::model::Order;
use alloy::primitives::B256;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// An event surfaced by the indexer, before de-duplication.
#[derive(Debug, Clone)]
pub enum IndexerEvent {
    NewOrder(Order),
    OrderFilled { commitment: B256, tx_hash: B256 },
}

impl IndexerEvent {
    fn dedup_key(&self) -> Option<B256> {
        match self {
            IndexerEvent::NewOrder(order) => order.id,
            IndexerEvent::OrderFilled { commitment, .. } => Some(*commitment),
        }
    }
}

/// The indexer subscription itself is an external collaborator (spec.md §1
/// Non-goal); this trait is the seam EventMonitor depends on.
pub trait IndexerSource: Send + Sync {
    fn subscribe(&self) -> BoxStream<'static, IndexerEvent>;
}

/// Sliding-window de-duplication over `order.id` (commitment), sized
/// `max(maxConcurrentOrders * 4, 256)` (spec.md §4.6).
pub fn dedup_window_size(max_concurrent_orders: usize) -> usize {
    (max_concurrent_orders * 4).max(256)
}

pub struct EventMonitor<S: IndexerSource> {
    source: S,
    dedup_capacity: usize,
}

impl<S: IndexerSource> EventMonitor<S> {
    pub fn new(source: S, max_concurrent_orders: usize) -> Self {
        Self { source, dedup_capacity: dedup_window_size(max_concurrent_orders) }
    }

    /// Runs until the upstream stream ends or `cancel` fires. Forwards
    /// de-duplicated events to `out`; a full `out` channel back-pressures
    /// (never drops) because `mpsc::Sender::send` suspends until capacity
    /// frees up.
    pub async fn run(&self, out: mpsc::Sender<IndexerEvent>, cancel: CancellationToken) {
        let capacity = NonZeroUsize::new(self.dedup_capacity).unwrap_or(NonZeroUsize::new(256).unwrap());
        let mut seen: LruCache<B256, ()> = LruCache::new(capacity);
        let mut stream = self.source.subscribe();

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = stream.next() => event,
            };

            let Some(event) = event else { break };

            if let Some(key) = event.dedup_key() {
                if seen.put(key, ()).is_some() {
                    continue;
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = out.send(event) => {
                    if result.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{PaymentInfo, StateMachineId, TokenInfo, NATIVE_TOKEN};
    use alloy::primitives::{Bytes, U256};
    use futures_util::stream;

    fn order_with_id(id: B256) -> Order {
        Order {
            user: B256::ZERO,
            source_chain: StateMachineId::new("EVM-97"),
            dest_chain: StateMachineId::new("EVM-10200"),
            deadline: 0,
            nonce: 0,
            fees: U256::ZERO,
            inputs: vec![TokenInfo { token: NATIVE_TOKEN, amount: U256::from(1) }],
            outputs: vec![PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(1), beneficiary: B256::ZERO }],
            call_data: Bytes::new(),
            id: Some(id),
            transaction_hash: None,
        }
    }

    struct FixedSource(Vec<IndexerEvent>);

    impl IndexerSource for FixedSource {
        fn subscribe(&self) -> BoxStream<'static, IndexerEvent> {
            Box::pin(stream::iter(self.0.clone()))
        }
    }

    #[test]
    fn dedup_window_respects_floor() {
        assert_eq!(dedup_window_size(4), 256);
        assert_eq!(dedup_window_size(100), 400);
    }

    #[tokio::test]
    async fn duplicate_new_order_suppressed() {
        let id = B256::repeat_byte(1);
        let events = vec![IndexerEvent::NewOrder(order_with_id(id)), IndexerEvent::NewOrder(order_with_id(id))];
        let monitor = EventMonitor::new(FixedSource(events), 16);

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        monitor.run(tx, cancel).await;

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn distinct_orders_both_forwarded() {
        let events = vec![
            IndexerEvent::NewOrder(order_with_id(B256::repeat_byte(1))),
            IndexerEvent::NewOrder(order_with_id(B256::repeat_byte(2))),
        ];
        let monitor = EventMonitor::new(FixedSource(events), 16);

        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        monitor.run(tx, cancel).await;

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop_promptly() {
        let events = vec![IndexerEvent::NewOrder(order_with_id(B256::repeat_byte(1)))];
        let monitor = EventMonitor::new(FixedSource(events), 16);
        let (tx, _rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Should return promptly even though the stream has an unconsumed item.
        tokio::time::timeout(std::time::Duration::from_millis(500), monitor.run(tx, cancel))
            .await
            .expect("run() did not observe cancellation promptly");
    }
}
