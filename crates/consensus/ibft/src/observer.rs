//! The bridge between the chain store and the consensus event loop.

use basalt_interfaces::events::{ChainAdded, ChainEvents};
use basalt_primitives::SealedHeader;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{broadcast, Notify};
use tracing::{trace, warn};

/// Events consumed by the consensus round state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IbftEvent {
    /// The canonical chain advanced to a new head.
    NewChainHead(SealedHeader),
}

/// A bounded queue feeding the consensus processor.
///
/// Enqueueing never blocks: when the queue is full the OLDEST event is
/// dropped to make room and the `ibft_event_queue_dropped` counter records
/// it. Consensus only ever cares about the freshest chain state, so
/// shedding from the front is the lossy-but-safe choice.
#[derive(Debug)]
pub struct IbftEventQueue {
    inner: Mutex<VecDeque<IbftEvent>>,
    capacity: usize,
    notify: Notify,
}

// === impl IbftEventQueue ===

impl IbftEventQueue {
    /// Creates a queue holding at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "event queue capacity must be non-zero");
        Self { inner: Mutex::new(VecDeque::with_capacity(capacity)), capacity, notify: Notify::new() }
    }

    /// Adds an event to the queue, dropping the oldest entry when full.
    pub fn enqueue(&self, event: IbftEvent) {
        {
            let mut queue = self.inner.lock();
            if queue.len() == self.capacity {
                let dropped = queue.pop_front();
                metrics::counter!("ibft_event_queue_dropped").increment(1);
                warn!(target: "consensus::ibft", ?dropped, "event queue full, dropping oldest");
            }
            queue.push_back(event);
        }
        self.notify.notify_one();
    }

    /// Waits for and returns the next event.
    pub async fn dequeue(&self) -> IbftEvent {
        loop {
            if let Some(event) = self.inner.lock().pop_front() {
                return event
            }
            self.notify.notified().await;
        }
    }

    /// Returns the next event if one is ready.
    pub fn try_dequeue(&self) -> Option<IbftEvent> {
        self.inner.lock().pop_front()
    }

    /// The number of queued events.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Forwards chain-added events into the consensus event queue.
#[derive(Debug, Clone)]
pub struct IbftChainObserver {
    queue: Arc<IbftEventQueue>,
}

// === impl IbftChainObserver ===

impl IbftChainObserver {
    /// Creates an observer feeding the given queue.
    pub fn new(queue: Arc<IbftEventQueue>) -> Self {
        Self { queue }
    }

    /// Handles a single chain-added event.
    pub fn on_chain_added(&self, event: ChainAdded) {
        let header = event.block.header.clone();
        trace!(
            target: "consensus::ibft",
            number = header.number,
            hash = %header.hash(),
            "observed new chain head"
        );
        self.queue.enqueue(IbftEvent::NewChainHead(header));
    }

    /// Subscribes to the chain store and forwards every event until the
    /// store goes away.
    pub fn spawn<E: ChainEvents>(events: &E, queue: Arc<IbftEventQueue>) -> tokio::task::JoinHandle<()> {
        let mut subscription = events.subscribe_chain_events();
        let observer = Self::new(queue);
        tokio::spawn(async move {
            loop {
                match subscription.recv().await {
                    Ok(event) => observer.on_chain_added(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(target: "consensus::ibft", skipped, "chain event subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_interfaces::test_utils::{generators::random_header, TestChain};
    use basalt_primitives::{SealedBlock, U256};

    fn head_event(number: u64) -> ChainAdded {
        ChainAdded {
            block: Arc::new(SealedBlock {
                header: random_header(number, None),
                body: Default::default(),
            }),
            receipts: Arc::new(Vec::new()),
            total_difficulty: U256::from(number),
        }
    }

    fn queued_numbers(queue: &IbftEventQueue) -> Vec<u64> {
        let mut numbers = Vec::new();
        while let Some(IbftEvent::NewChainHead(header)) = queue.try_dequeue() {
            numbers.push(header.number);
        }
        numbers
    }

    #[test]
    fn enqueue_dequeue_in_order() {
        let queue = IbftEventQueue::new(8);
        for number in 1..=3 {
            queue.enqueue(IbftEvent::NewChainHead(random_header(number, None)));
        }
        assert_eq!(queued_numbers(&queue), vec![1, 2, 3]);
    }

    #[test]
    fn overflow_drops_oldest() {
        let queue = IbftEventQueue::new(3);
        for number in 1..=5 {
            queue.enqueue(IbftEvent::NewChainHead(random_header(number, None)));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queued_numbers(&queue), vec![3, 4, 5]);
    }

    #[test]
    fn observer_enqueues_new_chain_head() {
        let queue = Arc::new(IbftEventQueue::new(4));
        let observer = IbftChainObserver::new(Arc::clone(&queue));

        observer.on_chain_added(head_event(7));

        match queue.try_dequeue() {
            Some(IbftEvent::NewChainHead(header)) => assert_eq!(header.number, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn spawned_observer_forwards_chain_events() {
        let chain = TestChain::with_head(3);
        let queue = Arc::new(IbftEventQueue::new(4));
        let task = IbftChainObserver::spawn(&chain, Arc::clone(&queue));

        chain.publish(head_event(4));
        let IbftEvent::NewChainHead(header) = queue.dequeue().await;
        assert_eq!(header.number, 4);

        drop(chain);
        task.await.unwrap();
    }
}
