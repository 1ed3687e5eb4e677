//! Error types for the eth wire protocol.

use alloy_primitives::B256;

/// Errors when decoding frames or validating the handshake.
#[derive(Debug, thiserror::Error)]
pub enum EthStreamError {
    /// The frame's RLP structure or field widths violate the schema.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] alloy_rlp::Error),
    /// The frame carries a message id outside the protocol's set.
    #[error("unknown message id: {0:#x}")]
    UnknownMessageId(u8),
    /// The handshake could not be completed.
    #[error(transparent)]
    EthHandshakeError(#[from] EthHandshakeError),
}

/// Error that can occur during the `eth` sub-protocol handshake.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EthHandshakeError {
    /// A status message arrived outside of the handshake.
    #[error("status message can only be received during the handshake")]
    StatusNotInHandshake,
    /// A non-status message arrived while the handshake was still pending.
    #[error("received message id {0:#x} while waiting for the peer's status")]
    NonStatusMessageInHandshake(u8),
    /// The peer participates in a different network.
    #[error("mismatched network id in status message: got {got}, expected {expected}")]
    MismatchedNetworkId {
        /// The network id the peer sent.
        got: u64,
        /// The locally configured network id.
        expected: u64,
    },
    /// The peer's chain starts from a different genesis.
    #[error("mismatched genesis in status message: got {got}, expected {expected}")]
    MismatchedGenesis {
        /// The genesis hash the peer sent.
        got: B256,
        /// The local genesis hash.
        expected: B256,
    },
}
