//! Serving block data requests out of the chain store.

use basalt_eth_wire::{
    BlockBodies, BlockHeaders, GetBlockBodies, GetBlockHeaders, GetNodeData, GetReceipts,
    NodeData, Receipts,
};
use basalt_interfaces::{
    p2p::error::RequestResult,
    provider::{BlockProvider, StateNodeReader},
};
use basalt_primitives::{BlockHashOrNumber, Header, HeadersDirection, PeerId};
use futures::StreamExt;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::sync::{mpsc::UnboundedReceiver, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{trace, warn};

/// Manages eth related requests on top of the p2p network.
///
/// This can be spawned to another task and is supposed to be run as a
/// background service. Session drivers deliver authenticated requests on the
/// incoming channel and the response is sent back through the request's
/// oneshot.
#[must_use = "Manager does nothing unless polled."]
pub struct EthRequestHandler<C, N> {
    /// The client type that can interact with the chain.
    client: Arc<C>,
    /// Resolves state entries for `GetNodeData`.
    node_reader: Arc<N>,
    /// Cap on items per response, uniform across request kinds.
    request_limit: usize,
    /// Incoming requests from the session drivers.
    incoming_requests: UnboundedReceiverStream<IncomingEthRequest>,
}

// === impl EthRequestHandler ===

impl<C, N> EthRequestHandler<C, N>
where
    C: BlockProvider,
    N: StateNodeReader,
{
    /// Create a new instance.
    pub fn new(
        client: Arc<C>,
        node_reader: Arc<N>,
        request_limit: u16,
        incoming: UnboundedReceiver<IncomingEthRequest>,
    ) -> Self {
        Self {
            client,
            node_reader,
            request_limit: request_limit as usize,
            incoming_requests: UnboundedReceiverStream::new(incoming),
        }
    }

    /// Returns the list of requested headers.
    ///
    /// The traversal starts at the resolved start header and steps by block
    /// number; the stride is `skip + 1` in the requested direction. It stops
    /// at the first absent number and when the next number leaves the valid
    /// range on either end.
    fn get_headers_response(&self, request: GetBlockHeaders) -> Vec<Header> {
        let GetBlockHeaders { start_block, max_headers, skip, direction } = request;

        let first = match start_block {
            BlockHashOrNumber::Hash(hash) => {
                self.client.header_by_hash(hash).unwrap_or_default()
            }
            BlockHashOrNumber::Number(number) => {
                self.client.header_by_number(number).unwrap_or_default()
            }
        };
        let Some(first) = first else { return Vec::new() };

        let count = (max_headers as usize).min(self.request_limit);
        if count == 0 {
            return Vec::new()
        }
        let start_number = first.number;
        let stride = skip as u64 + 1;

        let mut headers = Vec::with_capacity(count.min(64));
        headers.push(first);

        for i in 1..count as u64 {
            let number = match direction {
                HeadersDirection::Falling => {
                    stride.checked_mul(i).and_then(|delta| start_number.checked_sub(delta))
                }
                HeadersDirection::Rising => {
                    stride.checked_mul(i).and_then(|delta| start_number.checked_add(delta))
                }
            };
            // An overflowed number is past the end of the chain on either
            // side, same as dropping below genesis.
            let Some(number) = number else { break };

            match self.client.header_by_number(number).unwrap_or_default() {
                Some(header) => headers.push(header),
                None => break,
            }
        }

        headers
    }

    fn on_headers_request(
        &mut self,
        peer_id: PeerId,
        request: GetBlockHeaders,
        response: oneshot::Sender<RequestResult<BlockHeaders>>,
    ) {
        trace!(target: "net::eth", %peer_id, ?request, "serving GetBlockHeaders");
        let headers = self.get_headers_response(request);
        let _ = response.send(Ok(BlockHeaders(headers)));
    }

    fn on_bodies_request(
        &mut self,
        peer_id: PeerId,
        request: GetBlockBodies,
        response: oneshot::Sender<RequestResult<BlockBodies>>,
    ) {
        trace!(target: "net::eth", %peer_id, hashes = request.0.len(), "serving GetBlockBodies");
        let mut bodies = Vec::new();
        for hash in request.0.into_iter().take(self.request_limit) {
            // Unknown hashes are skipped, the response keeps the surviving
            // order.
            if let Some(body) = self.client.body_by_hash(hash).unwrap_or_default() {
                bodies.push(body);
            }
        }
        let _ = response.send(Ok(BlockBodies(bodies)));
    }

    fn on_receipts_request(
        &mut self,
        peer_id: PeerId,
        request: GetReceipts,
        response: oneshot::Sender<RequestResult<Receipts>>,
    ) {
        trace!(target: "net::eth", %peer_id, hashes = request.0.len(), "serving GetReceipts");
        let mut receipts = Vec::new();
        for hash in request.0.into_iter().take(self.request_limit) {
            if let Some(block_receipts) = self.client.receipts_by_hash(hash).unwrap_or_default() {
                receipts.push(block_receipts);
            }
        }
        let _ = response.send(Ok(Receipts(receipts)));
    }

    fn on_node_data_request(
        &mut self,
        peer_id: PeerId,
        request: GetNodeData,
        response: oneshot::Sender<RequestResult<NodeData>>,
    ) {
        trace!(target: "net::eth", %peer_id, hashes = request.0.len(), "serving GetNodeData");
        if !self.node_reader.is_available() {
            // An empty response is schema-legal; the gap is signalled rather
            // than silently stubbed.
            warn!(target: "net::eth", %peer_id, "node data serving is not supported by this node");
            let _ = response.send(Ok(NodeData(Vec::new())));
            return
        }

        let mut entries = Vec::new();
        for hash in request.0.into_iter().take(self.request_limit) {
            if let Some(node) = self.node_reader.node_by_hash(hash).unwrap_or_default() {
                entries.push(node);
            }
        }
        let _ = response.send(Ok(NodeData(entries)));
    }
}

/// An endless future.
///
/// This should be spawned or used as part of `tokio::select!`.
impl<C, N> Future for EthRequestHandler<C, N>
where
    C: BlockProvider,
    N: StateNodeReader,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            match this.incoming_requests.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => return Poll::Ready(()),
                Poll::Ready(Some(incoming)) => match incoming {
                    IncomingEthRequest::GetBlockHeaders { peer_id, request, response } => {
                        this.on_headers_request(peer_id, request, response)
                    }
                    IncomingEthRequest::GetBlockBodies { peer_id, request, response } => {
                        this.on_bodies_request(peer_id, request, response)
                    }
                    IncomingEthRequest::GetReceipts { peer_id, request, response } => {
                        this.on_receipts_request(peer_id, request, response)
                    }
                    IncomingEthRequest::GetNodeData { peer_id, request, response } => {
                        this.on_node_data_request(peer_id, request, response)
                    }
                },
            }
        }
    }
}

/// All `eth` requests related to blocks delegated by the sessions.
#[derive(Debug)]
pub enum IncomingEthRequest {
    /// Request block headers from the chain store.
    ///
    /// The response should be sent through the channel.
    GetBlockHeaders {
        /// The peer that sent the request.
        peer_id: PeerId,
        /// The decoded request.
        request: GetBlockHeaders,
        /// The channel the response is sent on.
        response: oneshot::Sender<RequestResult<BlockHeaders>>,
    },
    /// Request block bodies from the chain store.
    GetBlockBodies {
        /// The peer that sent the request.
        peer_id: PeerId,
        /// The decoded request.
        request: GetBlockBodies,
        /// The channel the response is sent on.
        response: oneshot::Sender<RequestResult<BlockBodies>>,
    },
    /// Request transaction receipts from the chain store.
    GetReceipts {
        /// The peer that sent the request.
        peer_id: PeerId,
        /// The decoded request.
        request: GetReceipts,
        /// The channel the response is sent on.
        response: oneshot::Sender<RequestResult<Receipts>>,
    },
    /// Request state entries from the state reader.
    GetNodeData {
        /// The peer that sent the request.
        peer_id: PeerId,
        /// The decoded request.
        request: GetNodeData,
        /// The channel the response is sent on.
        response: oneshot::Sender<RequestResult<NodeData>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_interfaces::{
        provider::NodeDataUnsupported,
        test_utils::{generators, TestChain},
    };
    use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

    const TEST_LIMIT: u16 = 192;

    fn spawn_handler(
        chain: Arc<TestChain>,
        limit: u16,
    ) -> UnboundedSender<IncomingEthRequest> {
        let (tx, rx) = unbounded_channel();
        let handler =
            EthRequestHandler::new(chain, Arc::new(NodeDataUnsupported::default()), limit, rx);
        tokio::spawn(handler);
        tx
    }

    async fn request_headers(
        to_server: &UnboundedSender<IncomingEthRequest>,
        request: GetBlockHeaders,
    ) -> Vec<Header> {
        let (tx, rx) = oneshot::channel();
        to_server
            .send(IncomingEthRequest::GetBlockHeaders {
                peer_id: PeerId::repeat_byte(0x80),
                request,
                response: tx,
            })
            .unwrap();
        rx.await.unwrap().unwrap().0
    }

    fn numbers(headers: &[Header]) -> Vec<u64> {
        headers.iter().map(|h| h.number).collect()
    }

    #[tokio::test]
    async fn forward_range() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: 5u64.into(),
            max_headers: 5,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn request_limit_clamps_response() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), 5);

        let request = GetBlockHeaders {
            start_block: 5u64.into(),
            max_headers: 10,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn reversed_with_skip() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: 10u64.into(),
            max_headers: 5,
            skip: 1,
            direction: HeadersDirection::Falling,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![10, 8, 6, 4, 2]);
    }

    #[tokio::test]
    async fn rising_with_skip() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: 5u64.into(),
            max_headers: 5,
            skip: 1,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![5, 7, 9, 11, 13]);
    }

    #[tokio::test]
    async fn partial_response_at_tip() {
        let head = 20;
        let chain = Arc::new(TestChain::with_head(head));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: (head - 1).into(),
            max_headers: 5,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![head - 1, head]);
    }

    #[tokio::test]
    async fn truncates_below_genesis() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: 1u64.into(),
            max_headers: 13,
            skip: 0,
            direction: HeadersDirection::Falling,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![1, 0]);
    }

    #[tokio::test]
    async fn resolves_start_by_hash() {
        let chain = Arc::new(TestChain::with_head(20));
        let start = chain.block_hash(7).unwrap();
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: start.into(),
            max_headers: 3,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert_eq!(numbers(&headers), vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn zero_max_headers_yields_empty_response() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: 5u64.into(),
            max_headers: 0,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn unknown_start_yields_empty_response() {
        let chain = Arc::new(TestChain::with_head(20));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockHeaders {
            start_block: generators::random_hash().into(),
            max_headers: 5,
            skip: 0,
            direction: HeadersDirection::Rising,
        };
        let headers = request_headers(&to_server, request).await;
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn bodies_skip_unknown_hashes() {
        let chain = Arc::new(TestChain::with_head(20));
        let known = chain.block_hash(3).unwrap();
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetBlockBodies(vec![
            generators::random_hash(),
            known,
            generators::random_hash(),
        ]);
        let (tx, rx) = oneshot::channel();
        to_server
            .send(IncomingEthRequest::GetBlockBodies {
                peer_id: PeerId::repeat_byte(0x80),
                request,
                response: tx,
            })
            .unwrap();
        let bodies = rx.await.unwrap().unwrap().0;
        assert_eq!(bodies.len(), 1);
        assert_eq!(Some(&bodies[0]), chain.body_by_hash(known).unwrap().as_ref());
    }

    #[tokio::test]
    async fn bodies_respect_request_limit() {
        let chain = Arc::new(TestChain::with_head(20));
        let hashes: Vec<_> = (0..10).map(|n| chain.block_hash(n).unwrap()).collect();
        let to_server = spawn_handler(Arc::clone(&chain), 4);

        let (tx, rx) = oneshot::channel();
        to_server
            .send(IncomingEthRequest::GetBlockBodies {
                peer_id: PeerId::repeat_byte(0x80),
                request: GetBlockBodies(hashes),
                response: tx,
            })
            .unwrap();
        let bodies = rx.await.unwrap().unwrap().0;
        assert_eq!(bodies.len(), 4);
    }

    #[tokio::test]
    async fn receipts_skip_unknown_hashes() {
        let chain = Arc::new(TestChain::with_head(20));
        let known = chain.block_hash(6).unwrap();
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let request = GetReceipts(vec![generators::random_hash(), known]);
        let (tx, rx) = oneshot::channel();
        to_server
            .send(IncomingEthRequest::GetReceipts {
                peer_id: PeerId::repeat_byte(0x80),
                request,
                response: tx,
            })
            .unwrap();
        let receipts = rx.await.unwrap().unwrap().0;
        assert_eq!(receipts.len(), 1);
        assert_eq!(Some(&receipts[0]), chain.receipts_by_hash(known).unwrap().as_ref());
    }

    #[tokio::test]
    async fn node_data_unsupported_yields_empty_response() {
        let chain = Arc::new(TestChain::with_head(5));
        let to_server = spawn_handler(Arc::clone(&chain), TEST_LIMIT);

        let (tx, rx) = oneshot::channel();
        to_server
            .send(IncomingEthRequest::GetNodeData {
                peer_id: PeerId::repeat_byte(0x80),
                request: GetNodeData(vec![generators::random_hash()]),
                response: tx,
            })
            .unwrap();
        let entries = rx.await.unwrap().unwrap().0;
        assert!(entries.is_empty());
    }
}
