use crate::{hash_for_proposer_seal, IbftExtraData};
use alloy_primitives::{b256, Address, B256, B64, U256};
use basalt_interfaces::consensus::ConsensusError;
use basalt_primitives::{
    constants::{EMPTY_OMMER_ROOT, EMPTY_ROOT},
    sign_message, Block, BlockBody, Header, SealedHeader,
};
use secp256k1::SecretKey;
use tracing::trace;

/// The fixed mix hash of IBFT blocks, the keccak digest tail of
/// "Istanbul practical byzantine fault tolerance".
pub const IBFT_MIX_HASH: B256 =
    b256!("63746963616c2062797a616e74696e65206661756c7420746f6c6572616e6365");

/// The fixed difficulty of IBFT blocks.
pub const IBFT_DIFFICULTY: u64 = 1;

/// Decides the gas limit of a new block from its parent's.
///
/// Blanket-implemented for closures, mirroring how the policy is injected
/// at the call sites.
pub trait GasLimitPolicy: Send + Sync {
    /// The gas limit for a child of a block with the given gas limit.
    fn next_gas_limit(&self, parent_gas_limit: u64) -> u64;
}

impl<F> GasLimitPolicy for F
where
    F: Fn(u64) -> u64 + Send + Sync,
{
    fn next_gas_limit(&self, parent_gas_limit: u64) -> u64 {
        (self)(parent_gas_limit)
    }
}

/// Builds candidate blocks for the local IBFT proposer.
///
/// The candidate carries an empty body: execution happens when the proposal
/// goes through the consensus rounds, not here.
pub struct IbftBlockProposer<P> {
    /// The address credited as the block's beneficiary.
    coinbase: Address,
    /// The validator set embedded into the proposal.
    validators: Vec<Address>,
    /// The injected gas limit policy.
    gas_limit_policy: P,
    /// The key the proposer seal is signed with.
    secret_key: SecretKey,
}

// === impl IbftBlockProposer ===

impl<P> IbftBlockProposer<P>
where
    P: GasLimitPolicy,
{
    /// Creates a proposer for the given validator set.
    pub fn new(
        coinbase: Address,
        validators: Vec<Address>,
        gas_limit_policy: P,
        secret_key: SecretKey,
    ) -> Self {
        Self { coinbase, validators, gas_limit_policy, secret_key }
    }

    /// Builds a candidate block on top of the parent.
    ///
    /// The header embeds the validator set with empty commit seals and a
    /// proposer seal over the signature-free hash. The timestamp advances
    /// past the parent's even when the requested one does not.
    pub fn propose(
        &self,
        parent: &SealedHeader,
        timestamp: u64,
    ) -> Result<Block, ConsensusError> {
        let extra = IbftExtraData::proposal(self.validators.clone());
        let mut header = Header {
            parent_hash: parent.hash(),
            ommers_hash: EMPTY_OMMER_ROOT,
            beneficiary: self.coinbase,
            // Execution is out of scope here; the state root carries over
            // until the proposal is executed by the consensus rounds.
            state_root: parent.state_root,
            transactions_root: EMPTY_ROOT,
            receipts_root: EMPTY_ROOT,
            logs_bloom: Default::default(),
            difficulty: U256::from(IBFT_DIFFICULTY),
            number: parent.number + 1,
            gas_limit: self.gas_limit_policy.next_gas_limit(parent.gas_limit),
            gas_used: 0,
            timestamp: timestamp.max(parent.timestamp + 1),
            extra_data: extra.encoded(),
            mix_hash: IBFT_MIX_HASH,
            nonce: B64::ZERO,
        };

        let digest = hash_for_proposer_seal(&header)?;
        let seal = sign_message(&self.secret_key, digest)
            .map_err(|_| ConsensusError::UnrecoverableProposerSeal)?;
        header.extra_data = extra.with_proposer_seal(seal).encoded();

        trace!(
            target: "consensus::ibft",
            number = header.number,
            parent = %parent.hash(),
            "assembled candidate block"
        );
        Ok(Block { header, body: BlockBody::default() })
    }
}
