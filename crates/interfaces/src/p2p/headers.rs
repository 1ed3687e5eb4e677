//! The client seam the header downloaders fetch through.

use crate::p2p::error::PeerRequestResult;
use basalt_primitives::{BlockHashOrNumber, Header, HeadersDirection, PeerId};
use std::{fmt::Debug, future::Future};

/// The header request to be sent to a connected peer, asking it to return
/// the requested range of headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersRequest {
    /// The starting block of the range.
    pub start: BlockHashOrNumber,
    /// The maximum number of headers in the response.
    pub limit: u64,
    /// The direction in which headers should be returned.
    pub direction: HeadersDirection,
}

/// The block headers downloader client.
///
/// Implementations pick a connected peer to serve each request. When the
/// caller names a peer to avoid, the implementation prefers a different one
/// whenever more than one is available.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait HeadersClient: Send + Sync + Debug {
    /// The future resolving to the peer's response.
    type Output: Future<Output = PeerRequestResult<Vec<Header>>> + Send + Unpin;

    /// Sends the header request to a connected peer, preferring one other
    /// than `avoid`, and returns the response received from it.
    fn get_headers(&self, request: HeadersRequest, avoid: Option<PeerId>) -> Self::Output;
}
