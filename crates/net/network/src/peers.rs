//! The registry of authenticated peers.
//!
//! The registry is the broadcast set of the node: session drivers register a
//! lightweight handle once the handshake completes and remove it when the
//! session ends. Writers are the session drivers only; the block propagator
//! and the fetch client are read-only consumers.

use crate::error::PeerGone;
use basalt_eth_wire::DisconnectReason;
use basalt_interfaces::p2p::{error::RequestResult, headers::HeadersRequest};
use basalt_primitives::{Header, PeerId};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, oneshot};

/// A frame handed to the transport layer for delivery to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// An encoded sub-protocol message.
    Message(bytes::Bytes),
    /// A disconnect with the given reason; the transport sends the reason
    /// code and closes the connection.
    Disconnect(DisconnectReason),
}

/// Commands a session driver accepts from other components.
#[derive(Debug)]
pub enum PeerCommand {
    /// Ask the peer for a range of headers.
    GetBlockHeaders {
        /// The range to request.
        request: HeadersRequest,
        /// Channel the response headers are delivered on.
        response: oneshot::Sender<RequestResult<Vec<Header>>>,
    },
    /// Disconnect the session with the given reason.
    Disconnect(DisconnectReason),
}

/// A lightweight handle to an authenticated session.
///
/// The handle never keeps the session alive: when the driver ends, sends
/// fail with [`PeerGone`].
#[derive(Debug, Clone)]
pub struct PeerHandle {
    peer_id: PeerId,
    to_wire: mpsc::UnboundedSender<OutboundFrame>,
    to_session: mpsc::UnboundedSender<PeerCommand>,
}

// === impl PeerHandle ===

impl PeerHandle {
    /// Creates a handle from the session's channels.
    pub fn new(
        peer_id: PeerId,
        to_wire: mpsc::UnboundedSender<OutboundFrame>,
        to_session: mpsc::UnboundedSender<PeerCommand>,
    ) -> Self {
        Self { peer_id, to_wire, to_session }
    }

    /// The id of the peer behind this handle.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Enqueues a frame on the peer's outbound channel.
    ///
    /// Frames enqueued here are FIFO with the session's own responses.
    pub fn send_frame(&self, frame: OutboundFrame) -> Result<(), PeerGone> {
        self.to_wire.send(frame).map_err(|_| PeerGone)
    }

    /// Sends a command to the session driver.
    pub fn send_command(&self, command: PeerCommand) -> Result<(), PeerGone> {
        self.to_session.send(command).map_err(|_| PeerGone)
    }
}

/// The writer side of the peer registry, held by session drivers.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    inner: Arc<RwLock<HashMap<PeerId, PeerHandle>>>,
}

// === impl PeerRegistry ===

impl PeerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the read-only handle used by broadcast and fetch.
    pub fn handle(&self) -> PeersHandle {
        PeersHandle { inner: Arc::clone(&self.inner) }
    }

    /// Adds an authenticated peer to the registry.
    pub fn register(&self, handle: PeerHandle) {
        self.inner.write().insert(handle.peer_id(), handle);
    }

    /// Removes a peer from the registry. Removing an absent peer is a no-op.
    pub fn unregister(&self, peer_id: PeerId) {
        self.inner.write().remove(&peer_id);
    }
}

/// Read access to the set of authenticated peers.
#[derive(Debug, Clone)]
pub struct PeersHandle {
    inner: Arc<RwLock<HashMap<PeerId, PeerHandle>>>,
}

// === impl PeersHandle ===

impl PeersHandle {
    /// The number of authenticated peers.
    pub fn peer_count(&self) -> usize {
        self.inner.read().len()
    }

    /// Snapshot of all authenticated peer handles.
    pub fn iter_peers(&self) -> Vec<PeerHandle> {
        self.inner.read().values().cloned().collect()
    }

    /// Picks a peer to serve a request, preferring one other than `avoid`
    /// when more than one is available.
    pub fn select_peer(&self, avoid: Option<PeerId>) -> Option<PeerHandle> {
        let peers = self.inner.read();
        peers
            .values()
            .find(|peer| Some(peer.peer_id()) != avoid)
            .or_else(|| avoid.and_then(|id| peers.get(&id)))
            .cloned()
    }
}
