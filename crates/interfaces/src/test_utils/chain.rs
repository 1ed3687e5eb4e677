use crate::{
    events::{ChainAdded, ChainEvents},
    provider::{BlockProvider, ChainHead, HeaderProvider, ProviderResult, StateNodeReader},
    test_utils::generators,
};
use basalt_primitives::{
    BlockBody, BlockHash, BlockNumber, Bytes, Header, Receipt, SealedHeader, B256, U256,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;

/// An in-memory chain of linked blocks implementing the provider traits.
#[derive(Debug)]
pub struct TestChain {
    headers: BTreeMap<BlockNumber, SealedHeader>,
    hash_to_number: HashMap<BlockHash, BlockNumber>,
    bodies: HashMap<BlockHash, BlockBody>,
    receipts: HashMap<BlockHash, Vec<Receipt>>,
    total_difficulty: U256,
    events: broadcast::Sender<ChainAdded>,
}

// === impl TestChain ===

impl TestChain {
    /// Generates a linked chain from genesis up to and including block
    /// `head_number`, each block carrying a small random body and receipt
    /// list.
    pub fn with_head(head_number: BlockNumber) -> Self {
        let (events, _) = broadcast::channel(64);
        let mut chain = Self {
            headers: BTreeMap::new(),
            hash_to_number: HashMap::new(),
            bodies: HashMap::new(),
            receipts: HashMap::new(),
            total_difficulty: U256::ZERO,
            events,
        };

        let mut parent: Option<B256> = None;
        for number in 0..=head_number {
            let header = generators::random_header(number, parent);
            parent = Some(header.hash());
            chain.insert(header, generators::random_body(1), vec![generators::random_receipt(21_000)]);
        }
        chain
    }

    /// Inserts a block at the tip of the chain.
    pub fn insert(&mut self, header: SealedHeader, body: BlockBody, receipts: Vec<Receipt>) {
        let hash = header.hash();
        self.total_difficulty += header.difficulty;
        self.hash_to_number.insert(hash, header.number);
        self.bodies.insert(hash, body);
        self.receipts.insert(hash, receipts);
        self.headers.insert(header.number, header);
    }

    /// The sealed header at the given number, if the chain contains it.
    pub fn sealed_header(&self, number: BlockNumber) -> Option<&SealedHeader> {
        self.headers.get(&number)
    }

    /// The hash of the block at the given number, if the chain contains it.
    pub fn block_hash(&self, number: BlockNumber) -> Option<BlockHash> {
        self.headers.get(&number).map(|h| h.hash())
    }

    /// Publishes a chain-added event to all subscribers.
    pub fn publish(&self, event: ChainAdded) {
        let _ = self.events.send(event);
    }
}

impl HeaderProvider for TestChain {
    fn header_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<Header>> {
        Ok(self
            .hash_to_number
            .get(&hash)
            .and_then(|number| self.headers.get(number))
            .map(|sealed| sealed.header().clone()))
    }

    fn header_by_number(&self, number: BlockNumber) -> ProviderResult<Option<Header>> {
        Ok(self.headers.get(&number).map(|sealed| sealed.header().clone()))
    }
}

impl BlockProvider for TestChain {
    fn body_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<BlockBody>> {
        Ok(self.bodies.get(&hash).cloned())
    }

    fn receipts_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<Vec<Receipt>>> {
        Ok(self.receipts.get(&hash).cloned())
    }

    fn chain_head(&self) -> ProviderResult<ChainHead> {
        let header = self
            .headers
            .values()
            .next_back()
            .cloned()
            .unwrap_or_default();
        Ok(ChainHead { header, total_difficulty: self.total_difficulty })
    }

    fn genesis_hash(&self) -> ProviderResult<BlockHash> {
        Ok(self.headers.get(&0).map(|h| h.hash()).unwrap_or_default())
    }
}

impl StateNodeReader for TestChain {
    fn node_by_hash(&self, _hash: B256) -> ProviderResult<Option<Bytes>> {
        Ok(None)
    }
}

impl ChainEvents for TestChain {
    fn subscribe_chain_events(&self) -> broadcast::Receiver<ChainAdded> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_chain_is_linked() {
        let chain = TestChain::with_head(10);
        for number in 1..=10 {
            let parent = chain.sealed_header(number - 1).unwrap().hash();
            assert_eq!(chain.sealed_header(number).unwrap().parent_hash, parent);
        }
        assert_eq!(chain.chain_head().unwrap().number(), 10);
        assert_eq!(chain.genesis_hash().unwrap(), chain.block_hash(0).unwrap());
    }
}
