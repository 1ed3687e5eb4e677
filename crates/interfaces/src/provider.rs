//! The read-only projection of the chain store consumed by the networking
//! layer: headers, bodies, receipts and the chain head snapshot.

use basalt_primitives::{
    BlockBody, BlockHash, BlockNumber, Bytes, Header, Receipt, SealedHeader, B256, U256,
};

/// Result alias for chain store reads.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors a chain store read can surface.
///
/// Absent entries are not errors: lookups return `Ok(None)`. An `Err` means
/// the storage boundary itself failed.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backing storage could not serve the read.
    #[error("chain storage is unavailable")]
    StorageUnavailable,
}

/// The current head of the chain: the sealed header plus the cumulative
/// difficulty up to and including it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainHead {
    /// The header at the tip of the canonical chain.
    pub header: SealedHeader,
    /// The total difficulty at the tip.
    pub total_difficulty: U256,
}

// === impl ChainHead ===

impl ChainHead {
    /// The hash of the head block.
    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    /// The number of the head block.
    pub fn number(&self) -> BlockNumber {
        self.header.number
    }
}

/// Client trait for fetching headers from the chain store.
#[auto_impl::auto_impl(&, Arc)]
pub trait HeaderProvider: Send + Sync {
    /// Returns the header with the given hash.
    fn header_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<Header>>;

    /// Returns the header at the given block number.
    fn header_by_number(&self, number: BlockNumber) -> ProviderResult<Option<Header>>;
}

/// Client trait for fetching block data from the chain store.
#[auto_impl::auto_impl(&, Arc)]
pub trait BlockProvider: HeaderProvider {
    /// Returns the body of the block with the given hash.
    fn body_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<BlockBody>>;

    /// Returns the receipts of the block with the given hash.
    fn receipts_by_hash(&self, hash: BlockHash) -> ProviderResult<Option<Vec<Receipt>>>;

    /// Returns a snapshot of the current chain head.
    fn chain_head(&self) -> ProviderResult<ChainHead>;

    /// Returns the hash of the genesis block.
    fn genesis_hash(&self) -> ProviderResult<BlockHash>;
}

/// Resolves state trie nodes and contract code by hash for `GET_NODE_DATA`.
///
/// Serving node data requires an archive-grade state database, which not
/// every node carries. Implementations without one advertise it through
/// [`is_available`](StateNodeReader::is_available) so the server can signal
/// the gap instead of silently serving nothing.
#[auto_impl::auto_impl(&, Arc)]
pub trait StateNodeReader: Send + Sync {
    /// Whether this reader is backed by a real state database.
    fn is_available(&self) -> bool {
        true
    }

    /// Returns the raw trie node or code blob with the given hash.
    fn node_by_hash(&self, hash: B256) -> ProviderResult<Option<Bytes>>;
}

/// A [`StateNodeReader`] for nodes that do not serve state data.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct NodeDataUnsupported;

impl StateNodeReader for NodeDataUnsupported {
    fn is_available(&self) -> bool {
        false
    }

    fn node_by_hash(&self, _hash: B256) -> ProviderResult<Option<Bytes>> {
        Ok(None)
    }
}
