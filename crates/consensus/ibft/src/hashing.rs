use crate::IbftExtraData;
use alloy_primitives::B256;
use basalt_interfaces::consensus::ConsensusError;
use basalt_primitives::{BlockHashFunction, Header};

/// The digest the proposer signs: the header hashed with its extra data
/// stripped of the proposer seal and all commit seals.
pub fn hash_for_proposer_seal(header: &Header) -> Result<B256, ConsensusError> {
    let extra = IbftExtraData::decode_from_header(header)?;
    Ok(hash_with_extra(header, &extra.unsigned()))
}

fn hash_with_extra(header: &Header, extra: &IbftExtraData) -> B256 {
    let mut stripped = header.clone();
    stripped.extra_data = extra.encoded();
    stripped.hash_slow()
}

/// The chain-active hash function of IBFT-legacy networks.
///
/// The block identity excludes the proposer seal bytes inside the extra
/// data, so re-sealing a proposal does not change the hash the network
/// refers to it by. Headers whose extra data is not an IBFT payload (the
/// genesis block configured with plain bytes) fall back to the full
/// encoding.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct IbftHashFunction;

impl BlockHashFunction for IbftHashFunction {
    fn hash(&self, header: &Header) -> B256 {
        match IbftExtraData::decode_from_header(header) {
            Ok(extra) => hash_with_extra(header, &extra.without_proposer_seal()),
            Err(_) => header.hash_slow(),
        }
    }
}
