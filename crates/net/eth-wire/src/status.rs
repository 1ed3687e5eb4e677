use crate::SubProtocol;
use alloy_primitives::{B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use std::fmt;

/// The status message is used in the handshake to ensure that peers are on
/// the same network and chain.
///
/// The total difficulty is not guaranteed to correspond to the advertised
/// head hash and should be treated as untrusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Status {
    /// The sub-protocol version the sender speaks, e.g. 63 for `eth/63`.
    pub version: u32,
    /// The id of the network the sender participates in.
    pub network_id: u64,
    /// Total difficulty of the sender's best chain.
    pub total_difficulty: U256,
    /// The hash of the sender's best known block.
    pub head_hash: B256,
    /// The genesis hash of the sender's chain.
    pub genesis_hash: B256,
}

// === impl Status ===

impl Status {
    /// Helper for returning a builder for the status message.
    pub fn builder() -> StatusBuilder {
        Default::default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status {{ version: {}, network_id: {}, total_difficulty: {}, head: {}, genesis: {} }}",
            self.version, self.network_id, self.total_difficulty, self.head_hash, self.genesis_hash
        )
    }
}

/// Builder for [`Status`] messages.
#[derive(Debug, Default)]
pub struct StatusBuilder {
    status: Status,
}

// === impl StatusBuilder ===

impl StatusBuilder {
    /// Consumes the type and creates the actual [`Status`] message.
    pub fn build(self) -> Status {
        self.status
    }

    /// Sets the protocol version from the advertised sub-protocol.
    pub fn protocol(mut self, protocol: SubProtocol) -> Self {
        self.status.version = protocol.status_version();
        self
    }

    /// Sets the network id.
    pub fn network_id(mut self, network_id: u64) -> Self {
        self.status.network_id = network_id;
        self
    }

    /// Sets the total difficulty of the best chain.
    pub fn total_difficulty(mut self, total_difficulty: U256) -> Self {
        self.status.total_difficulty = total_difficulty;
        self
    }

    /// Sets the best known block hash.
    pub fn head_hash(mut self, head_hash: B256) -> Self {
        self.status.head_hash = head_hash;
        self
    }

    /// Sets the genesis hash.
    pub fn genesis_hash(mut self, genesis_hash: B256) -> Self {
        self.status.genesis_hash = genesis_hash;
        self
    }
}
