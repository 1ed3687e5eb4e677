//! Types for broadcasting new data to peers.

use alloy_primitives::{B256, U256};
use alloy_rlp::{RlpDecodable, RlpDecodableWrapper, RlpEncodable, RlpEncodableWrapper};
use basalt_primitives::{Block, TransactionSigned};

/// This informs peers of new blocks that have appeared on the network.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct NewBlockHashes(
    /// New block hashes and the block number for each blockhash.
    pub Vec<BlockHashNumber>,
);

/// A block hash _and_ a block number.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct BlockHashNumber {
    /// The block hash.
    pub hash: B256,
    /// The block number.
    pub number: u64,
}

/// A new block with the current total difficulty, which includes the
/// difficulty of the broadcast block.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct NewBlock {
    /// The new block.
    pub block: Block,
    /// The current total difficulty.
    pub total_difficulty: U256,
}

/// This informs peers of transactions that have appeared on the network and
/// are not yet included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct Transactions(
    /// New transactions for the peer to include in its mempool.
    pub Vec<TransactionSigned>,
);
