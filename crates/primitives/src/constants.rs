//! Ethereum protocol constants.

use alloy_primitives::{b256, B256};

/// Keccak256 hash of the RLP encoding of an empty list, the `ommers_hash` of a
/// block without uncles.
pub const EMPTY_OMMER_ROOT: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// Root hash of an empty trie, used for the transaction and receipt roots of
/// an empty block.
pub const EMPTY_ROOT: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// The bound divisor of the gas limit, used to enforce how much a block's gas
/// limit may drift from its parent's.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Minimum gas limit a header may carry.
pub const MINIMUM_GAS_LIMIT: u64 = 5000;

/// Maximum gas limit a header may carry (2^63 - 1).
pub const MAXIMUM_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;
