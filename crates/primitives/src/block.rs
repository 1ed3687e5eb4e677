use crate::{Header, SealedHeader, TransactionSigned};
use alloy_rlp::{length_of_length, Decodable, Encodable, RlpDecodable, RlpEncodable};

/// The body of a block: its transactions and ommer headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct BlockBody {
    /// The transactions in the block.
    pub transactions: Vec<TransactionSigned>,
    /// The ommer headers of the block.
    pub ommers: Vec<Header>,
}

/// An Ethereum block: header plus body.
///
/// The wire encoding is the flat three-element list
/// `[header, transactions, ommers]`, so the body fields are inlined rather
/// than nested.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The block header.
    pub header: Header,
    /// The block body.
    pub body: BlockBody,
}

// === impl Block ===

impl Block {
    /// Seal the block, memoizing the header hash.
    pub fn seal_slow(self) -> SealedBlock {
        SealedBlock { header: self.header.seal_slow(), body: self.body }
    }

    fn payload_length(&self) -> usize {
        self.header.length() +
            self.body.transactions.length() +
            self.body.ommers.length()
    }
}

impl Encodable for Block {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header =
            alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.header.encode(out);
        self.body.transactions.encode(out);
        self.body.ommers.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for Block {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = alloy_rlp::Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        Ok(Self {
            header: Header::decode(buf)?,
            body: BlockBody {
                transactions: Vec::<TransactionSigned>::decode(buf)?,
                ommers: Vec::<Header>::decode(buf)?,
            },
        })
    }
}

/// A [`Block`] whose header has been sealed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SealedBlock {
    /// The sealed header.
    pub header: SealedHeader,
    /// The block body.
    pub body: BlockBody,
}

// === impl SealedBlock ===

impl SealedBlock {
    /// Discard the memoized header hash.
    pub fn unseal(self) -> Block {
        Block { header: self.header.unseal(), body: self.body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_encodes_as_flat_list() {
        let block = Block {
            header: Header { number: 11, ..Default::default() },
            body: BlockBody {
                transactions: vec![TransactionSigned::default()],
                ommers: vec![Header { number: 10, ..Default::default() }],
            },
        };

        let mut encoded = Vec::new();
        block.encode(&mut encoded);
        assert_eq!(encoded.len(), block.length());
        assert_eq!(Block::decode(&mut encoded.as_slice()).unwrap(), block);
    }
}
