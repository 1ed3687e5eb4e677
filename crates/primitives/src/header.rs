use crate::{BlockHash, BlockNumber};
use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use std::ops::Deref;

/// Block header.
///
/// Carries the fifteen canonical pre-London fields; the wire encoding is the
/// plain RLP list of the fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Header {
    /// The Keccak 256-bit hash of the parent block's header.
    pub parent_hash: B256,
    /// The Keccak 256-bit hash of the ommers list portion of this block.
    pub ommers_hash: B256,
    /// The 160-bit address to which all fees collected from the successful
    /// mining of this block are transferred.
    pub beneficiary: Address,
    /// The Keccak 256-bit hash of the root node of the state trie, after all
    /// transactions are executed.
    pub state_root: B256,
    /// The Keccak 256-bit hash of the root node of the trie structure
    /// populated with each transaction in the block.
    pub transactions_root: B256,
    /// The Keccak 256-bit hash of the root node of the trie structure
    /// populated with the receipts of each transaction in the block.
    pub receipts_root: B256,
    /// The Bloom filter composed from indexable information contained in each
    /// log entry from the receipts.
    pub logs_bloom: Bloom,
    /// The scalar value corresponding to the difficulty level of this block.
    pub difficulty: U256,
    /// The number of ancestor blocks.
    pub number: BlockNumber,
    /// The scalar value equal to the current limit of gas expenditure per
    /// block.
    pub gas_limit: u64,
    /// The scalar value equal to the total gas used in transactions in this
    /// block.
    pub gas_used: u64,
    /// The Unix timestamp at this block's inception.
    pub timestamp: u64,
    /// An arbitrary byte array containing data relevant to this block.
    pub extra_data: Bytes,
    /// A 256-bit hash which, combined with the nonce, proves that a
    /// sufficient amount of computation has been carried out on this block.
    pub mix_hash: B256,
    /// A 64-bit value which, combined with the mix hash, proves that a
    /// sufficient amount of computation has been carried out on this block.
    pub nonce: B64,
}

// === impl Header ===

impl Header {
    /// Heavy function that will calculate the hash of the fully RLP encoded
    /// header.
    pub fn hash_slow(&self) -> BlockHash {
        let mut out = Vec::<u8>::new();
        self.encode(&mut out);
        keccak256(&out)
    }

    /// Seal the header with the given block hash.
    ///
    /// WARNING: the hash is not verified against the header contents.
    pub fn seal(self, hash: BlockHash) -> SealedHeader {
        SealedHeader { header: self, hash }
    }

    /// Calculate the keccak hash of the header and seal it so it can't be
    /// changed.
    pub fn seal_slow(self) -> SealedHeader {
        let hash = self.hash_slow();
        self.seal(hash)
    }
}

/// A [`Header`] bundled with the hash it was sealed with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SealedHeader {
    /// The sealed header.
    header: Header,
    /// The memoized hash.
    hash: BlockHash,
}

// === impl SealedHeader ===

impl SealedHeader {
    /// Returns the sealed header's hash.
    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    /// Returns a reference to the inner header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Extract the inner header, discarding the memoized hash.
    pub fn unseal(self) -> Header {
        self.header
    }
}

impl Deref for SealedHeader {
    type Target = Header;

    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

/// The hash function that identifies a header on the active chain.
///
/// Most chains hash the full RLP encoding of the header; IBFT-legacy chains
/// redefine this to exclude the proposer seal carried inside `extra_data`.
/// The function is injected wherever headers are sealed so the schedule
/// lookup stays a collaborator, not a global.
#[auto_impl::auto_impl(&, Arc)]
pub trait BlockHashFunction: Send + Sync {
    /// Compute the chain-active hash of the header.
    fn hash(&self, header: &Header) -> BlockHash;

    /// Seal the header under this hash function.
    fn seal(&self, header: Header) -> SealedHeader {
        let hash = self.hash(&header);
        header.seal(hash)
    }
}

/// The mainnet hash function: keccak256 over the full header encoding.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct KeccakHashFunction;

impl BlockHashFunction for KeccakHashFunction {
    fn hash(&self, header: &Header) -> BlockHash {
        header.hash_slow()
    }
}
