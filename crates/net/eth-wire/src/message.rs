use crate::{
    errors::EthStreamError, BlockBodies, BlockHeaders, GetBlockBodies, GetBlockHeaders,
    GetNodeData, GetReceipts, NewBlock, NewBlockHashes, NodeData, Receipts, Status, Transactions,
};
use alloy_rlp::{Decodable, Encodable};

/// Represents message ids of the eth/63 message set.
///
/// The id is written as a single raw byte in front of the RLP payload; the
/// outer framing layer carries no further discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EthMessageID {
    /// The status message id.
    Status = 0x00,
    /// The new block hashes announcement id.
    NewBlockHashes = 0x01,
    /// The transactions gossip id.
    Transactions = 0x02,
    /// The block headers request id.
    GetBlockHeaders = 0x03,
    /// The block headers response id.
    BlockHeaders = 0x04,
    /// The block bodies request id.
    GetBlockBodies = 0x05,
    /// The block bodies response id.
    BlockBodies = 0x06,
    /// The new block announcement id.
    NewBlock = 0x07,
    /// The node data request id.
    GetNodeData = 0x0d,
    /// The node data response id.
    NodeData = 0x0e,
    /// The receipts request id.
    GetReceipts = 0x0f,
    /// The receipts response id.
    Receipts = 0x10,
}

// === impl EthMessageID ===

impl EthMessageID {
    /// Returns the id as a `u8`.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether the message is a request a peer expects us to answer.
    pub const fn is_request(&self) -> bool {
        matches!(
            self,
            EthMessageID::GetBlockHeaders |
                EthMessageID::GetBlockBodies |
                EthMessageID::GetNodeData |
                EthMessageID::GetReceipts
        )
    }

    /// Whether the message answers one of our outbound requests.
    pub const fn is_response(&self) -> bool {
        matches!(
            self,
            EthMessageID::BlockHeaders |
                EthMessageID::BlockBodies |
                EthMessageID::NodeData |
                EthMessageID::Receipts
        )
    }
}

impl TryFrom<u8> for EthMessageID {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(EthMessageID::Status),
            0x01 => Ok(EthMessageID::NewBlockHashes),
            0x02 => Ok(EthMessageID::Transactions),
            0x03 => Ok(EthMessageID::GetBlockHeaders),
            0x04 => Ok(EthMessageID::BlockHeaders),
            0x05 => Ok(EthMessageID::GetBlockBodies),
            0x06 => Ok(EthMessageID::BlockBodies),
            0x07 => Ok(EthMessageID::NewBlock),
            0x0d => Ok(EthMessageID::GetNodeData),
            0x0e => Ok(EthMessageID::NodeData),
            0x0f => Ok(EthMessageID::GetReceipts),
            0x10 => Ok(EthMessageID::Receipts),
            _ => Err(value),
        }
    }
}

/// Represents a message in the eth wire protocol.
///
/// The `Status` variant is only allowed during the handshake; everything
/// else requires an `Active` session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthMessage {
    /// The status message during the handshake.
    Status(Status),
    /// An announcement of new block hashes.
    NewBlockHashes(NewBlockHashes),
    /// Gossiped transactions.
    Transactions(Transactions),
    /// A block headers request.
    GetBlockHeaders(GetBlockHeaders),
    /// A block headers response.
    BlockHeaders(BlockHeaders),
    /// A block bodies request.
    GetBlockBodies(GetBlockBodies),
    /// A block bodies response.
    BlockBodies(BlockBodies),
    /// An announcement of a new block.
    NewBlock(Box<NewBlock>),
    /// A node data request.
    GetNodeData(GetNodeData),
    /// A node data response.
    NodeData(NodeData),
    /// A receipts request.
    GetReceipts(GetReceipts),
    /// A receipts response.
    Receipts(Receipts),
}

// === impl EthMessage ===

impl EthMessage {
    /// Returns the message's id.
    pub const fn message_id(&self) -> EthMessageID {
        match self {
            EthMessage::Status(_) => EthMessageID::Status,
            EthMessage::NewBlockHashes(_) => EthMessageID::NewBlockHashes,
            EthMessage::Transactions(_) => EthMessageID::Transactions,
            EthMessage::GetBlockHeaders(_) => EthMessageID::GetBlockHeaders,
            EthMessage::BlockHeaders(_) => EthMessageID::BlockHeaders,
            EthMessage::GetBlockBodies(_) => EthMessageID::GetBlockBodies,
            EthMessage::BlockBodies(_) => EthMessageID::BlockBodies,
            EthMessage::NewBlock(_) => EthMessageID::NewBlock,
            EthMessage::GetNodeData(_) => EthMessageID::GetNodeData,
            EthMessage::NodeData(_) => EthMessageID::NodeData,
            EthMessage::GetReceipts(_) => EthMessageID::GetReceipts,
            EthMessage::Receipts(_) => EthMessageID::Receipts,
        }
    }
}

impl Encodable for EthMessage {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self {
            EthMessage::Status(msg) => msg.encode(out),
            EthMessage::NewBlockHashes(msg) => msg.encode(out),
            EthMessage::Transactions(msg) => msg.encode(out),
            EthMessage::GetBlockHeaders(msg) => msg.encode(out),
            EthMessage::BlockHeaders(msg) => msg.encode(out),
            EthMessage::GetBlockBodies(msg) => msg.encode(out),
            EthMessage::BlockBodies(msg) => msg.encode(out),
            EthMessage::NewBlock(msg) => msg.encode(out),
            EthMessage::GetNodeData(msg) => msg.encode(out),
            EthMessage::NodeData(msg) => msg.encode(out),
            EthMessage::GetReceipts(msg) => msg.encode(out),
            EthMessage::Receipts(msg) => msg.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self {
            EthMessage::Status(msg) => msg.length(),
            EthMessage::NewBlockHashes(msg) => msg.length(),
            EthMessage::Transactions(msg) => msg.length(),
            EthMessage::GetBlockHeaders(msg) => msg.length(),
            EthMessage::BlockHeaders(msg) => msg.length(),
            EthMessage::GetBlockBodies(msg) => msg.length(),
            EthMessage::BlockBodies(msg) => msg.length(),
            EthMessage::NewBlock(msg) => msg.length(),
            EthMessage::GetNodeData(msg) => msg.length(),
            EthMessage::NodeData(msg) => msg.length(),
            EthMessage::GetReceipts(msg) => msg.length(),
            EthMessage::Receipts(msg) => msg.length(),
        }
    }
}

/// An `EthMessage` alongside its message id, as framed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolMessage {
    /// The message's id.
    pub message_id: EthMessageID,
    /// The message's payload.
    pub message: EthMessage,
}

// === impl ProtocolMessage ===

impl ProtocolMessage {
    /// Decodes a frame: one raw id byte followed by the RLP payload.
    ///
    /// The buffer is borrowed for the duration of the call; nothing is
    /// retained on either the success or the failure path.
    pub fn decode(buf: &mut &[u8]) -> Result<Self, EthStreamError> {
        let id = *buf.first().ok_or(EthStreamError::MalformedFrame(
            alloy_rlp::Error::InputTooShort,
        ))?;
        let message_id = EthMessageID::try_from(id).map_err(EthStreamError::UnknownMessageId)?;
        *buf = &buf[1..];

        let message = match message_id {
            EthMessageID::Status => EthMessage::Status(Status::decode(buf)?),
            EthMessageID::NewBlockHashes => {
                EthMessage::NewBlockHashes(NewBlockHashes::decode(buf)?)
            }
            EthMessageID::Transactions => EthMessage::Transactions(Transactions::decode(buf)?),
            EthMessageID::GetBlockHeaders => {
                EthMessage::GetBlockHeaders(GetBlockHeaders::decode(buf)?)
            }
            EthMessageID::BlockHeaders => EthMessage::BlockHeaders(BlockHeaders::decode(buf)?),
            EthMessageID::GetBlockBodies => {
                EthMessage::GetBlockBodies(GetBlockBodies::decode(buf)?)
            }
            EthMessageID::BlockBodies => EthMessage::BlockBodies(BlockBodies::decode(buf)?),
            EthMessageID::NewBlock => EthMessage::NewBlock(Box::new(NewBlock::decode(buf)?)),
            EthMessageID::GetNodeData => EthMessage::GetNodeData(GetNodeData::decode(buf)?),
            EthMessageID::NodeData => EthMessage::NodeData(NodeData::decode(buf)?),
            EthMessageID::GetReceipts => EthMessage::GetReceipts(GetReceipts::decode(buf)?),
            EthMessageID::Receipts => EthMessage::Receipts(Receipts::decode(buf)?),
        };
        Ok(ProtocolMessage { message_id, message })
    }

    /// Encodes the frame into a freshly allocated buffer.
    pub fn encoded(&self) -> bytes::Bytes {
        let mut out = Vec::with_capacity(1 + self.message.length());
        self.encode(&mut out);
        out.into()
    }
}

impl Encodable for ProtocolMessage {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        out.put_u8(self.message_id.to_u8());
        self.message.encode(out);
    }

    fn length(&self) -> usize {
        1 + self.message.length()
    }
}

impl From<EthMessage> for ProtocolMessage {
    fn from(message: EthMessage) -> Self {
        ProtocolMessage { message_id: message.message_id(), message }
    }
}
