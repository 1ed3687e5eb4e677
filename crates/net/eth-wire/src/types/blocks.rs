//! Implements the `GetBlockHeaders`, `BlockHeaders`, `GetBlockBodies` and
//! `BlockBodies` message types.

use alloy_primitives::B256;
use alloy_rlp::{RlpDecodable, RlpDecodableWrapper, RlpEncodable, RlpEncodableWrapper};
use basalt_primitives::{BlockBody, BlockHashOrNumber, Header, HeadersDirection};

/// A request for a peer to return block headers starting at the requested
/// block.
///
/// The peer must return at most `max_headers`, traversing `skip + 1` blocks
/// per step in the requested direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct GetBlockHeaders {
    /// The block to start the traversal at: a hash the peer resolves, or a
    /// plain block number.
    pub start_block: BlockHashOrNumber,
    /// The maximum number of headers to return.
    pub max_headers: u32,
    /// The number of blocks the peer skips between returned headers.
    pub skip: u32,
    /// The traversal direction; encoded as the `reverse` flag.
    pub direction: HeadersDirection,
}

/// The response to [`GetBlockHeaders`], containing headers ordered by the
/// request's traversal.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct BlockHeaders(
    /// The requested headers.
    pub Vec<Header>,
);

impl From<Vec<Header>> for BlockHeaders {
    fn from(headers: Vec<Header>) -> Self {
        BlockHeaders(headers)
    }
}

/// A request for a peer to return the bodies of the blocks with the given
/// hashes.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct GetBlockBodies(
    /// The hashes of the blocks whose bodies are requested.
    pub Vec<B256>,
);

impl From<Vec<B256>> for GetBlockBodies {
    fn from(hashes: Vec<B256>) -> Self {
        GetBlockBodies(hashes)
    }
}

/// The response to [`GetBlockBodies`].
///
/// Bodies of unknown blocks are simply absent, so the response may be
/// shorter than the request.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct BlockBodies(
    /// The bodies of the requested blocks, in surviving request order.
    pub Vec<BlockBody>,
);

impl From<Vec<BlockBody>> for BlockBodies {
    fn from(bodies: Vec<BlockBody>) -> Self {
        BlockBodies(bodies)
    }
}
