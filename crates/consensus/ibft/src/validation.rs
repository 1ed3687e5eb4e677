//! The attached validation ruleset for IBFT-legacy proposed blocks.

use crate::{hash_for_proposer_seal, IbftExtraData, IBFT_DIFFICULTY};
use alloy_primitives::{Address, U256};
use basalt_interfaces::consensus::{Consensus, ConsensusError};
use basalt_primitives::{
    constants::{GAS_LIMIT_BOUND_DIVISOR, MAXIMUM_GAS_LIMIT, MINIMUM_GAS_LIMIT},
    SealedHeader,
};

/// Validates headers under the IBFT-legacy ruleset.
///
/// The validator set is read from the header's own extra data; the proposer
/// seal must recover to one of its members.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct IbftConsensus;

// === impl IbftConsensus ===

impl IbftConsensus {
    /// Recovers the proposer address from the header's proposer seal.
    pub fn recover_proposer(header: &SealedHeader) -> Result<Address, ConsensusError> {
        let extra = IbftExtraData::decode_from_header(header)?;
        let seal = extra.proposer_seal.ok_or(ConsensusError::MissingProposerSeal)?;
        let digest = hash_for_proposer_seal(header)?;
        seal.recover_signer(digest).ok_or(ConsensusError::UnrecoverableProposerSeal)
    }

    fn validate_gas_limit_bounds(header: &SealedHeader) -> Result<(), ConsensusError> {
        if header.gas_limit < MINIMUM_GAS_LIMIT || header.gas_limit > MAXIMUM_GAS_LIMIT {
            return Err(ConsensusError::GasLimitOutOfBounds { gas_limit: header.gas_limit })
        }
        Ok(())
    }

    fn validate_gas_limit_delta(
        header: &SealedHeader,
        parent: &SealedHeader,
    ) -> Result<(), ConsensusError> {
        let bound = parent.gas_limit / GAS_LIMIT_BOUND_DIVISOR;
        if header.gas_limit.abs_diff(parent.gas_limit) >= bound.max(1) {
            return Err(ConsensusError::GasLimitInvalidDelta {
                parent_gas_limit: parent.gas_limit,
                child_gas_limit: header.gas_limit,
            })
        }
        Ok(())
    }
}

impl Consensus for IbftConsensus {
    fn validate_header(&self, header: &SealedHeader) -> Result<(), ConsensusError> {
        if header.gas_used > header.gas_limit {
            return Err(ConsensusError::HeaderGasUsedExceedsGasLimit {
                gas_used: header.gas_used,
                gas_limit: header.gas_limit,
            })
        }
        Self::validate_gas_limit_bounds(header)?;

        if header.difficulty != U256::from(IBFT_DIFFICULTY) {
            return Err(ConsensusError::DifficultyMismatch {
                got: header.difficulty.saturating_to(),
                expected: IBFT_DIFFICULTY,
            })
        }

        // The extra data has to round-trip, carry validators and a proposer
        // seal that recovers to one of them.
        let extra = IbftExtraData::decode_from_header(header)?;
        if extra.validators.is_empty() {
            return Err(ConsensusError::EmptyValidatorSet)
        }
        let proposer = Self::recover_proposer(header)?;
        if !extra.validators.contains(&proposer) {
            return Err(ConsensusError::ProposerNotInValidatorSet { proposer })
        }

        Ok(())
    }

    fn validate_header_against_parent(
        &self,
        header: &SealedHeader,
        parent: &SealedHeader,
    ) -> Result<(), ConsensusError> {
        if parent.number + 1 != header.number {
            return Err(ConsensusError::ParentBlockNumberMismatch {
                parent_block_number: parent.number,
                block_number: header.number,
            })
        }
        if header.parent_hash != parent.hash() {
            return Err(ConsensusError::ParentHashMismatch)
        }
        if header.timestamp <= parent.timestamp {
            return Err(ConsensusError::TimestampNotAfterParent {
                parent_timestamp: parent.timestamp,
                timestamp: header.timestamp,
            })
        }
        Self::validate_gas_limit_delta(header, parent)?;
        Ok(())
    }
}
