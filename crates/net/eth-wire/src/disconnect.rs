use alloy_rlp::{Decodable, Encodable};
use std::fmt;

/// The reason a session was, or is about to be, disconnected.
///
/// The discriminants are the devp2p wire codes; the reason byte is sent to
/// the remote peer before the transport is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The transport layer reported the remote end gone.
    RemoteConnectionReset = 0x01,
    /// Breach of protocol: a malformed message, bad RLP, an out-of-order
    /// handshake or an incompatible status.
    BreachOfProtocol = 0x02,
    /// The peer is of no use: no matching protocols or no useful data.
    UselessPeer = 0x03,
    /// Either the remote or local node has too many peers.
    TooManyPeers = 0x04,
    /// Already connected to the peer.
    AlreadyConnected = 0x05,
    /// The peer speaks an incompatible protocol version.
    IncompatibleProtocol = 0x06,
    /// The peer presented a null node identity.
    NullNodeIdentity = 0x07,
    /// The client is shutting down.
    ClientQuit = 0x08,
    /// The identity presented in the handshake is not the one expected.
    UnexpectedIdentity = 0x09,
    /// A sub-protocol decided the peer has to go.
    SubprotocolTriggered = 0x10,
}

// === impl DisconnectReason ===

impl DisconnectReason {
    /// The wire code of the reason.
    pub const fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DisconnectReason::RemoteConnectionReset => "remote connection reset",
            DisconnectReason::BreachOfProtocol => "breach of protocol",
            DisconnectReason::UselessPeer => "useless peer",
            DisconnectReason::TooManyPeers => "too many peers",
            DisconnectReason::AlreadyConnected => "already connected",
            DisconnectReason::IncompatibleProtocol => "incompatible protocol version",
            DisconnectReason::NullNodeIdentity => "null node identity",
            DisconnectReason::ClientQuit => "client quitting",
            DisconnectReason::UnexpectedIdentity => "unexpected identity in handshake",
            DisconnectReason::SubprotocolTriggered => "subprotocol-specific reason",
        };
        write!(f, "{message}")
    }
}

/// This represents an unknown disconnect reason with the given code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown disconnect reason: {0}")]
pub struct UnknownDisconnectReason(u8);

impl TryFrom<u8> for DisconnectReason {
    type Error = UnknownDisconnectReason;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(DisconnectReason::RemoteConnectionReset),
            0x02 => Ok(DisconnectReason::BreachOfProtocol),
            0x03 => Ok(DisconnectReason::UselessPeer),
            0x04 => Ok(DisconnectReason::TooManyPeers),
            0x05 => Ok(DisconnectReason::AlreadyConnected),
            0x06 => Ok(DisconnectReason::IncompatibleProtocol),
            0x07 => Ok(DisconnectReason::NullNodeIdentity),
            0x08 => Ok(DisconnectReason::ClientQuit),
            0x09 => Ok(DisconnectReason::UnexpectedIdentity),
            0x10 => Ok(DisconnectReason::SubprotocolTriggered),
            _ => Err(UnknownDisconnectReason(value)),
        }
    }
}

impl Encodable for DisconnectReason {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.code().encode(out)
    }

    fn length(&self) -> usize {
        self.code().length()
    }
}

impl Decodable for DisconnectReason {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let code = u8::decode(buf)?;
        DisconnectReason::try_from(code)
            .map_err(|_| alloy_rlp::Error::Custom("unknown disconnect reason"))
    }
}
