#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! Commonly used types in basalt.
//!
//! This crate contains Ethereum primitive types shared by the networking,
//! download and consensus layers.

mod block;
mod block_id;
pub mod constants;
mod header;
mod peer;
mod receipt;
mod signature;
mod transaction;

pub use block::{Block, BlockBody, SealedBlock};
pub use block_id::{BlockHashOrNumber, HeadersDirection};
pub use constants::{EMPTY_OMMER_ROOT, EMPTY_ROOT};
pub use header::{BlockHashFunction, Header, KeccakHashFunction, SealedHeader};
pub use peer::{PeerId, WithPeerId};
pub use receipt::{Log, Receipt};
pub use signature::{public_key_to_address, recover_signer, sign_message, Signature};
pub use transaction::{TransactionKind, TransactionSigned};

pub use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B512, B64, U256};

/// A block hash.
pub type BlockHash = B256;

/// A block number.
pub type BlockNumber = u64;
