//! The client other components use to fetch data from connected peers.

use crate::peers::{PeerCommand, PeersHandle};
use basalt_interfaces::p2p::{
    error::{PeerRequestResult, RequestError},
    headers::{HeadersClient, HeadersRequest},
};
use basalt_primitives::{Header, PeerId, WithPeerId};
use std::{future::Future, pin::Pin};
use tokio::sync::oneshot;
use tracing::trace;

type HeadersFut = Pin<Box<dyn Future<Output = PeerRequestResult<Vec<Header>>> + Send>>;

/// Front-end for sending requests to whichever authenticated peer is
/// available.
///
/// The downloader acquires a peer through this client per request; it never
/// retains one. When the caller asks to avoid a peer, the selection prefers
/// a different one whenever the registry holds more than one session.
#[derive(Debug, Clone)]
pub struct FetchClient {
    peers: PeersHandle,
}

// === impl FetchClient ===

impl FetchClient {
    /// Creates a client over the given peer set.
    pub fn new(peers: PeersHandle) -> Self {
        Self { peers }
    }
}

impl HeadersClient for FetchClient {
    type Output = HeadersFut;

    fn get_headers(&self, request: HeadersRequest, avoid: Option<PeerId>) -> Self::Output {
        let peers = self.peers.clone();
        Box::pin(async move {
            let Some(peer) = peers.select_peer(avoid) else {
                return Err(RequestError::NotConnected)
            };
            trace!(target: "net", peer = %peer.peer_id(), ?request, "fetching headers");

            let (tx, rx) = oneshot::channel();
            peer.send_command(PeerCommand::GetBlockHeaders { request, response: tx })
                .map_err(|_| RequestError::ConnectionDropped)?;

            let headers = rx.await??;
            Ok(WithPeerId::new(peer.peer_id(), headers))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::{PeerHandle, PeerRegistry};
    use basalt_primitives::HeadersDirection;
    use tokio::sync::mpsc;

    fn request() -> HeadersRequest {
        HeadersRequest { start: 9u64.into(), limit: 10, direction: HeadersDirection::Falling }
    }

    #[tokio::test]
    async fn no_peers_means_not_connected() {
        let registry = PeerRegistry::new();
        let client = FetchClient::new(registry.handle());
        let result = client.get_headers(request(), None).await;
        assert_eq!(result, Err(RequestError::NotConnected));
    }

    #[tokio::test]
    async fn routes_request_to_session_driver() {
        let registry = PeerRegistry::new();
        let (to_wire, _wire_rx) = mpsc::unbounded_channel();
        let (to_session, mut session_rx) = mpsc::unbounded_channel();
        let peer_id = PeerId::repeat_byte(0x05);
        registry.register(PeerHandle::new(peer_id, to_wire, to_session));

        let client = FetchClient::new(registry.handle());
        let fut = client.get_headers(request(), None);

        let answer = tokio::spawn(async move {
            let Some(PeerCommand::GetBlockHeaders { request, response }) =
                session_rx.recv().await
            else {
                panic!("expected headers command")
            };
            assert_eq!(request.limit, 10);
            let _ = response.send(Ok(vec![Header { number: 9, ..Default::default() }]));
        });

        let result = fut.await.unwrap();
        assert_eq!(result.peer_id(), peer_id);
        assert_eq!(result.data().len(), 1);
        answer.await.unwrap();
    }

    #[tokio::test]
    async fn dead_session_surfaces_connection_dropped() {
        let registry = PeerRegistry::new();
        let (to_wire, _wire_rx) = mpsc::unbounded_channel();
        let (to_session, session_rx) = mpsc::unbounded_channel();
        registry.register(PeerHandle::new(PeerId::repeat_byte(0x06), to_wire, to_session));
        drop(session_rx);

        let client = FetchClient::new(registry.handle());
        let result = client.get_headers(request(), None).await;
        assert_eq!(result, Err(RequestError::ConnectionDropped));
    }
}
