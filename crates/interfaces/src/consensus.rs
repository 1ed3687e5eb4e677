//! The consensus seam: header validation against a parent, as required when
//! importing downloaded headers or checking a locally built proposal.

use basalt_primitives::{Address, BlockNumber, SealedHeader};
use std::fmt::Debug;

/// Consensus is a protocol that decides whether a header is acceptable on the
/// chain it governs.
#[auto_impl::auto_impl(&, Arc)]
pub trait Consensus: Debug + Send + Sync {
    /// Validate a standalone header: internal consistency and the rules that
    /// need no ancestor context.
    fn validate_header(&self, header: &SealedHeader) -> Result<(), ConsensusError>;

    /// Validate the header against its parent.
    ///
    /// **This should not be called for the genesis block**.
    fn validate_header_against_parent(
        &self,
        header: &SealedHeader,
        parent: &SealedHeader,
    ) -> Result<(), ConsensusError>;
}

/// Consensus errors.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// The gas used in the header exceeds its gas limit.
    #[error("block used gas ({gas_used}) is greater than gas limit ({gas_limit})")]
    HeaderGasUsedExceedsGasLimit {
        /// The gas used in the block header.
        gas_used: u64,
        /// The gas limit in the block header.
        gas_limit: u64,
    },

    /// The block number does not follow the parent block number.
    #[error(
        "block number {block_number} does not match parent block number {parent_block_number}"
    )]
    ParentBlockNumberMismatch {
        /// The parent block number.
        parent_block_number: BlockNumber,
        /// The block number.
        block_number: BlockNumber,
    },

    /// The parent hash field does not reference the parent.
    #[error("block parent hash does not match the supplied parent header")]
    ParentHashMismatch,

    /// The timestamp does not advance past the parent's.
    #[error("block timestamp {timestamp} is not after parent timestamp {parent_timestamp}")]
    TimestampNotAfterParent {
        /// The parent block's timestamp.
        parent_timestamp: u64,
        /// The block's timestamp.
        timestamp: u64,
    },

    /// The gas limit is outside the protocol bounds.
    #[error("gas limit {gas_limit} is outside the allowed range")]
    GasLimitOutOfBounds {
        /// The gas limit in the block header.
        gas_limit: u64,
    },

    /// The gas limit drifted too far from the parent's.
    #[error(
        "child gas_limit {child_gas_limit} deviates more than {parent_gas_limit}/1024 from parent"
    )]
    GasLimitInvalidDelta {
        /// The parent gas limit.
        parent_gas_limit: u64,
        /// The child gas limit.
        child_gas_limit: u64,
    },

    /// The difficulty does not match the fixed value the chain requires.
    #[error("block difficulty {got} does not match the required difficulty {expected}")]
    DifficultyMismatch {
        /// The difficulty carried by the header, truncated to 64 bits.
        got: u64,
        /// The required difficulty.
        expected: u64,
    },

    /// The extra data field could not be decoded.
    #[error("header extra data is not a well-formed consensus payload")]
    InvalidExtraData,

    /// The embedded validator set is empty.
    #[error("header carries an empty validator set")]
    EmptyValidatorSet,

    /// The proposer seal is missing from the extra data.
    #[error("header extra data carries no proposer seal")]
    MissingProposerSeal,

    /// The proposer seal could not be recovered to an address.
    #[error("proposer seal does not recover to a valid signer")]
    UnrecoverableProposerSeal,

    /// The recovered proposer is not part of the validator set.
    #[error("proposer {proposer} is not a member of the validator set")]
    ProposerNotInValidatorSet {
        /// The address recovered from the proposer seal.
        proposer: Address,
    },
}
