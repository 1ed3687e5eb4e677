use crate::{BlockHash, BlockNumber};
use alloy_primitives::B256;
use alloy_rlp::{Decodable, Encodable, EMPTY_STRING_CODE};

/// Either a block hash or a block number, as used to anchor a headers
/// request.
///
/// The RLP forms are disjoint: a hash is always a 32-byte string (header byte
/// `0xa0`), a number never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockHashOrNumber {
    /// The hash of a block.
    Hash(BlockHash),
    /// The number of a block.
    Number(BlockNumber),
}

// === impl BlockHashOrNumber ===

impl BlockHashOrNumber {
    /// Returns the hash if this is a hash variant.
    pub fn as_hash(&self) -> Option<BlockHash> {
        match self {
            Self::Hash(hash) => Some(*hash),
            Self::Number(_) => None,
        }
    }

    /// Returns the number if this is a number variant.
    pub fn as_number(&self) -> Option<BlockNumber> {
        match self {
            Self::Hash(_) => None,
            Self::Number(number) => Some(*number),
        }
    }
}

impl From<BlockHash> for BlockHashOrNumber {
    fn from(hash: BlockHash) -> Self {
        Self::Hash(hash)
    }
}

impl From<BlockNumber> for BlockHashOrNumber {
    fn from(number: BlockNumber) -> Self {
        Self::Number(number)
    }
}

impl Encodable for BlockHashOrNumber {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self {
            Self::Hash(hash) => hash.encode(out),
            Self::Number(number) => number.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Hash(hash) => hash.length(),
            Self::Number(number) => number.length(),
        }
    }
}

impl Decodable for BlockHashOrNumber {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let first = *buf.first().ok_or(alloy_rlp::Error::InputTooShort)?;
        // A 32-byte string holds a hash, everything else must parse as number.
        if first == EMPTY_STRING_CODE + 32 {
            Ok(Self::Hash(B256::decode(buf)?))
        } else {
            Ok(Self::Number(u64::decode(buf)?))
        }
    }
}

/// The traversal direction of a headers request, derived from the `reverse`
/// flag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadersDirection {
    /// Rising block numbers: `reverse == false`.
    #[default]
    Rising,
    /// Falling block numbers: `reverse == true`.
    Falling,
}

// === impl HeadersDirection ===

impl HeadersDirection {
    /// Builds the direction from the wire-level `reverse` flag.
    pub fn new(reverse: bool) -> Self {
        if reverse {
            Self::Falling
        } else {
            Self::Rising
        }
    }

    /// Returns true for falling block numbers.
    pub fn is_falling(&self) -> bool {
        matches!(self, Self::Falling)
    }

    /// Returns the wire-level `reverse` flag for this direction.
    pub fn is_reverse(&self) -> bool {
        self.is_falling()
    }
}

impl From<bool> for HeadersDirection {
    fn from(reverse: bool) -> Self {
        Self::new(reverse)
    }
}

impl Encodable for HeadersDirection {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.is_reverse().encode(out)
    }

    fn length(&self) -> usize {
        self.is_reverse().length()
    }
}

impl Decodable for HeadersDirection {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(bool::decode(buf)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_or_number_roundtrip() {
        let cases = [
            BlockHashOrNumber::Hash(B256::repeat_byte(0xab)),
            BlockHashOrNumber::Number(0),
            BlockHashOrNumber::Number(1),
            BlockHashOrNumber::Number(u64::MAX),
        ];
        for case in cases {
            let mut encoded = Vec::new();
            case.encode(&mut encoded);
            assert_eq!(encoded.len(), case.length());
            assert_eq!(BlockHashOrNumber::decode(&mut encoded.as_slice()).unwrap(), case);
        }
    }

    #[test]
    fn direction_from_reverse_flag() {
        assert_eq!(HeadersDirection::new(true), HeadersDirection::Falling);
        assert_eq!(HeadersDirection::new(false), HeadersDirection::Rising);
    }

    #[test]
    fn hash_or_number_accessors() {
        let hash = B256::repeat_byte(0x01);
        assert_eq!(BlockHashOrNumber::from(hash).as_hash(), Some(hash));
        assert_eq!(BlockHashOrNumber::from(hash).as_number(), None);
        assert_eq!(BlockHashOrNumber::from(7u64).as_number(), Some(7));
        assert_eq!(BlockHashOrNumber::from(7u64).as_hash(), None);
    }
}
