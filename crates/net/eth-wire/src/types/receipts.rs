//! Implements the `GetReceipts` and `Receipts` message types.

use alloy_primitives::B256;
use alloy_rlp::{RlpDecodableWrapper, RlpEncodableWrapper};
use basalt_primitives::Receipt;

/// A request for transaction receipts of the blocks with the given hashes.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct GetReceipts(
    /// The hashes of the blocks whose receipts are requested.
    pub Vec<B256>,
);

/// The response to [`GetReceipts`], one receipt list per resolved block.
///
/// Receipts of unknown blocks are simply absent, so the response may be
/// shorter than the request.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct Receipts(
    /// The receipt lists of the requested blocks, in surviving request
    /// order.
    pub Vec<Vec<Receipt>>,
);
