//! Chain events published by the chain store as blocks are appended.

use basalt_primitives::{Receipt, SealedBlock, U256};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Emitted by the chain store for every block appended to the canonical
/// chain.
#[derive(Debug, Clone)]
pub struct ChainAdded {
    /// The appended block.
    pub block: Arc<SealedBlock>,
    /// The receipts produced by the block.
    pub receipts: Arc<Vec<Receipt>>,
    /// The total difficulty including the appended block.
    pub total_difficulty: U256,
}

/// A source of [`ChainAdded`] events.
#[auto_impl::auto_impl(&, Arc)]
pub trait ChainEvents: Send + Sync {
    /// Subscribe to chain-added events.
    ///
    /// Events published before the subscription are not replayed.
    fn subscribe_chain_events(&self) -> broadcast::Receiver<ChainAdded>;
}
