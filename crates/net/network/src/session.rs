//! The per-peer session: handshake, dispatch and disconnect handling.
//!
//! A session speaks the sub-protocol over frames whose outer RLPx handling
//! is done by the transport. It owns the handshake gate: the local `Status`
//! is the first outbound message, the peer's `Status` must be the first
//! inbound one, and only a compatible pair makes the session `Active`.

use crate::{
    error::PeerGone,
    eth_requests::IncomingEthRequest,
    peers::{OutboundFrame, PeerCommand, PeerHandle, PeerRegistry},
};
use basalt_eth_wire::{
    DisconnectReason, EthHandshakeError, EthMessage, GetBlockHeaders, NewBlock, ProtocolMessage,
    Status, SubProtocol,
};
use basalt_interfaces::p2p::error::{RequestError, RequestResult};
use basalt_primitives::{Header, PeerId};
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

/// The lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The connection is established, nothing has been sent yet.
    Opened,
    /// The local status is out, awaiting the peer's.
    StatusSent,
    /// The peer's status arrived and is being validated.
    StatusReceived,
    /// The handshake completed; requests flow.
    Active,
    /// The session ended with the given reason.
    Disconnected(DisconnectReason),
}

/// What the driver has to do after feeding a frame into the session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Nothing; keep feeding frames.
    Continue,
    /// An authenticated request to dispatch to the eth server.
    Request(EthMessage),
    /// The peer announced a newly sealed block.
    BlockAnnounced(Box<NewBlock>),
    /// The session ended.
    Disconnected(DisconnectReason),
}

/// A response the session awaits from the peer.
///
/// eth/63 carries no request ids, so responses are matched to outstanding
/// requests in FIFO order.
#[derive(Debug)]
enum PendingResponse {
    Headers(oneshot::Sender<RequestResult<Vec<Header>>>),
}

/// A live sub-protocol association with a single remote peer.
#[derive(Debug)]
pub struct PeerSession {
    peer_id: PeerId,
    state: SessionState,
    protocol: SubProtocol,
    local_status: Status,
    peer_status: Option<Status>,
    to_wire: mpsc::UnboundedSender<OutboundFrame>,
    pending_responses: VecDeque<PendingResponse>,
}

// === impl PeerSession ===

impl PeerSession {
    /// Creates a session for a freshly established connection.
    pub fn new(
        peer_id: PeerId,
        protocol: SubProtocol,
        local_status: Status,
        to_wire: mpsc::UnboundedSender<OutboundFrame>,
    ) -> Self {
        Self {
            peer_id,
            state: SessionState::Opened,
            protocol,
            local_status,
            peer_status: None,
            to_wire,
            pending_responses: VecDeque::new(),
        }
    }

    /// The id of the remote peer.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The negotiated sub-protocol.
    pub fn protocol(&self) -> SubProtocol {
        self.protocol
    }

    /// The peer's status, available once the handshake completed.
    pub fn peer_status(&self) -> Option<&Status> {
        self.peer_status.as_ref()
    }

    /// Whether the handshake completed and requests flow.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Sends the local status, the first outbound message of every session.
    pub fn open(&mut self) -> Result<(), PeerGone> {
        debug_assert!(matches!(self.state, SessionState::Opened));
        self.send_frame(EthMessage::Status(self.local_status))?;
        self.state = SessionState::StatusSent;
        Ok(())
    }

    /// Feeds an inbound frame into the session.
    pub fn on_frame(&mut self, frame: &[u8]) -> SessionOutcome {
        if let SessionState::Disconnected(reason) = self.state {
            return SessionOutcome::Disconnected(reason)
        }

        let mut buf = frame;
        let message = match ProtocolMessage::decode(&mut buf) {
            Ok(message) => message.message,
            Err(err) => {
                trace!(target: "net::session", peer = %self.peer_id, %err, "failed to decode frame");
                return self.breach()
            }
        };

        match message {
            EthMessage::Status(status) => match self.on_status(status) {
                Ok(()) => SessionOutcome::Continue,
                Err(err) => {
                    debug!(target: "net::session", peer = %self.peer_id, %err, "handshake failed");
                    self.breach()
                }
            },
            message if !self.is_active() => {
                // The handshake gate: nothing but STATUS may come first.
                let err = EthHandshakeError::NonStatusMessageInHandshake(
                    message.message_id().to_u8(),
                );
                debug!(target: "net::session", peer = %self.peer_id, %err, "handshake failed");
                self.breach()
            }
            EthMessage::GetBlockHeaders(_) |
            EthMessage::GetBlockBodies(_) |
            EthMessage::GetReceipts(_) |
            EthMessage::GetNodeData(_) => SessionOutcome::Request(message),
            EthMessage::BlockHeaders(headers) => {
                match self.pending_responses.pop_front() {
                    Some(PendingResponse::Headers(tx)) => {
                        let _ = tx.send(Ok(headers.0));
                        SessionOutcome::Continue
                    }
                    None => {
                        trace!(target: "net::session", peer = %self.peer_id, "unsolicited headers response");
                        self.breach()
                    }
                }
            }
            EthMessage::BlockBodies(_) | EthMessage::NodeData(_) | EthMessage::Receipts(_) => {
                // The session never issues these requests, so any response is
                // unsolicited.
                trace!(target: "net::session", peer = %self.peer_id, "unsolicited response");
                self.breach()
            }
            EthMessage::NewBlock(block) => SessionOutcome::BlockAnnounced(block),
            EthMessage::NewBlockHashes(_) | EthMessage::Transactions(_) => {
                trace!(target: "net::session", peer = %self.peer_id, "ignoring gossip message");
                SessionOutcome::Continue
            }
        }
    }

    fn on_status(&mut self, status: Status) -> Result<(), EthHandshakeError> {
        if self.is_active() {
            return Err(EthHandshakeError::StatusNotInHandshake)
        }
        self.state = SessionState::StatusReceived;

        if status.network_id != self.local_status.network_id {
            return Err(EthHandshakeError::MismatchedNetworkId {
                got: status.network_id,
                expected: self.local_status.network_id,
            })
        }
        if status.genesis_hash != self.local_status.genesis_hash {
            return Err(EthHandshakeError::MismatchedGenesis {
                got: status.genesis_hash,
                expected: self.local_status.genesis_hash,
            })
        }

        trace!(target: "net::session", peer = %self.peer_id, %status, "session active");
        self.peer_status = Some(status);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Sends a message to the peer.
    ///
    /// On a gone transport the session moves to
    /// `Disconnected(RemoteConnectionReset)` and the caller gets [`PeerGone`]
    /// to discard.
    pub fn send_message(&mut self, message: EthMessage) -> Result<(), PeerGone> {
        self.send_frame(message)
    }

    /// Sends a headers request to the peer, registering the channel the
    /// response is delivered on.
    pub fn request_headers(
        &mut self,
        request: GetBlockHeaders,
        response: oneshot::Sender<RequestResult<Vec<Header>>>,
    ) -> Result<(), PeerGone> {
        if !self.is_active() {
            let _ = response.send(Err(RequestError::NotConnected));
            return Err(PeerGone)
        }
        self.send_frame(EthMessage::GetBlockHeaders(request))?;
        self.pending_responses.push_back(PendingResponse::Headers(response));
        Ok(())
    }

    /// Disconnects the session, sending the reason to the peer before the
    /// transport is closed. Repeated calls are no-ops.
    pub fn disconnect(&mut self, reason: DisconnectReason) {
        if matches!(self.state, SessionState::Disconnected(_)) {
            return
        }
        debug!(target: "net::session", peer = %self.peer_id, %reason, "disconnecting session");
        let _ = self.to_wire.send(OutboundFrame::Disconnect(reason));
        self.fail_pending();
        self.state = SessionState::Disconnected(reason);
    }

    /// Marks the session dead after the transport vanished without a
    /// disconnect exchange.
    pub fn on_transport_closed(&mut self) {
        if matches!(self.state, SessionState::Disconnected(_)) {
            return
        }
        self.fail_pending();
        self.state = SessionState::Disconnected(DisconnectReason::RemoteConnectionReset);
    }

    fn breach(&mut self) -> SessionOutcome {
        self.disconnect(DisconnectReason::BreachOfProtocol);
        SessionOutcome::Disconnected(DisconnectReason::BreachOfProtocol)
    }

    fn send_frame(&mut self, message: EthMessage) -> Result<(), PeerGone> {
        let frame = ProtocolMessage::from(message).encoded();
        if self.to_wire.send(OutboundFrame::Message(frame)).is_err() {
            self.on_transport_closed();
            return Err(PeerGone)
        }
        Ok(())
    }

    fn fail_pending(&mut self) {
        while let Some(pending) = self.pending_responses.pop_front() {
            match pending {
                PendingResponse::Headers(tx) => {
                    let _ = tx.send(Err(RequestError::ConnectionDropped));
                }
            }
        }
    }
}

/// Drives a session: feeds inbound frames, serializes request handling and
/// executes commands from other components.
///
/// The driver awaits each server response before pulling the next inbound
/// frame, which yields per-peer FIFO ordering with at most one in-flight
/// handler per session. The peer is registered in `registry` once the
/// handshake completes and removed when the driver returns.
pub async fn drive_session(
    mut session: PeerSession,
    mut inbound: mpsc::UnboundedReceiver<bytes::Bytes>,
    mut commands: mpsc::UnboundedReceiver<PeerCommand>,
    to_server: mpsc::UnboundedSender<IncomingEthRequest>,
    registry: PeerRegistry,
    handle: PeerHandle,
) {
    let mut registered = false;
    if session.open().is_err() {
        return
    }

    loop {
        tokio::select! {
            frame = inbound.recv() => match frame {
                None => {
                    session.on_transport_closed();
                    break
                }
                Some(frame) => match session.on_frame(&frame) {
                    SessionOutcome::Continue => {}
                    SessionOutcome::Request(message) => {
                        dispatch_request(&mut session, &to_server, message).await;
                    }
                    SessionOutcome::BlockAnnounced(block) => {
                        trace!(
                            target: "net::session",
                            peer = %session.peer_id(),
                            number = block.block.header.number,
                            "peer announced new block"
                        );
                    }
                    SessionOutcome::Disconnected(_) => break,
                }
            },
            command = commands.recv() => match command {
                None => break,
                Some(PeerCommand::GetBlockHeaders { request, response }) => {
                    let request = GetBlockHeaders {
                        start_block: request.start,
                        max_headers: request.limit as u32,
                        skip: 0,
                        direction: request.direction,
                    };
                    if session.request_headers(request, response).is_err() {
                        // PeerGone: the transport is dead, stop driving.
                        break
                    }
                }
                Some(PeerCommand::Disconnect(reason)) => {
                    session.disconnect(reason);
                    break
                }
            },
        }

        if matches!(session.state(), SessionState::Disconnected(_)) {
            break
        }
        if session.is_active() && !registered {
            registry.register(handle.clone());
            registered = true;
        }
    }

    if registered {
        registry.unregister(session.peer_id());
    }
}

async fn dispatch_request(
    session: &mut PeerSession,
    to_server: &mpsc::UnboundedSender<IncomingEthRequest>,
    message: EthMessage,
) {
    let peer_id = session.peer_id();
    match message {
        EthMessage::GetBlockHeaders(request) => {
            let (tx, rx) = oneshot::channel();
            let request = IncomingEthRequest::GetBlockHeaders { peer_id, request, response: tx };
            if to_server.send(request).is_err() {
                return
            }
            if let Ok(Ok(response)) = rx.await {
                // A gone peer means there is nobody left to answer.
                let _ = session.send_message(EthMessage::BlockHeaders(response));
            }
        }
        EthMessage::GetBlockBodies(request) => {
            let (tx, rx) = oneshot::channel();
            let request = IncomingEthRequest::GetBlockBodies { peer_id, request, response: tx };
            if to_server.send(request).is_err() {
                return
            }
            if let Ok(Ok(response)) = rx.await {
                let _ = session.send_message(EthMessage::BlockBodies(response));
            }
        }
        EthMessage::GetReceipts(request) => {
            let (tx, rx) = oneshot::channel();
            let request = IncomingEthRequest::GetReceipts { peer_id, request, response: tx };
            if to_server.send(request).is_err() {
                return
            }
            if let Ok(Ok(response)) = rx.await {
                let _ = session.send_message(EthMessage::Receipts(response));
            }
        }
        EthMessage::GetNodeData(request) => {
            let (tx, rx) = oneshot::channel();
            let request = IncomingEthRequest::GetNodeData { peer_id, request, response: tx };
            if to_server.send(request).is_err() {
                return
            }
            if let Ok(Ok(response)) = rx.await {
                let _ = session.send_message(EthMessage::NodeData(response));
            }
        }
        _ => unreachable!("only requests are dispatched"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use basalt_eth_wire::{BlockHeaders, EthMessageID, GetBlockBodies};
    use basalt_primitives::{B256, U256};

    fn local_status() -> Status {
        Status {
            version: 63,
            network_id: 1,
            total_difficulty: U256::from(100u64),
            head_hash: B256::repeat_byte(0xbe),
            genesis_hash: B256::repeat_byte(0x11),
        }
    }

    fn peer_status() -> Status {
        Status { head_hash: B256::repeat_byte(0xef), ..local_status() }
    }

    fn encode(message: EthMessage) -> bytes::Bytes {
        ProtocolMessage::from(message).encoded()
    }

    fn session() -> (PeerSession, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (to_wire, wire_rx) = mpsc::unbounded_channel();
        let session = PeerSession::new(
            PeerId::repeat_byte(0x01),
            SubProtocol::Eth63,
            local_status(),
            to_wire,
        );
        (session, wire_rx)
    }

    fn active_session() -> (PeerSession, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (mut session, mut wire_rx) = session();
        session.open().unwrap();
        // drain the outbound status
        let _ = wire_rx.try_recv().unwrap();
        assert_matches!(
            session.on_frame(&encode(EthMessage::Status(peer_status()))),
            SessionOutcome::Continue
        );
        assert!(session.is_active());
        (session, wire_rx)
    }

    fn assert_disconnected_with(
        session: &PeerSession,
        wire_rx: &mut mpsc::UnboundedReceiver<OutboundFrame>,
        reason: DisconnectReason,
    ) {
        assert_eq!(session.state(), SessionState::Disconnected(reason));
        // the reason frame is the last thing on the wire
        let mut last = None;
        while let Ok(frame) = wire_rx.try_recv() {
            last = Some(frame);
        }
        assert_eq!(last, Some(OutboundFrame::Disconnect(reason)));
    }

    #[test]
    fn status_is_first_outbound_message() {
        let (mut session, mut wire_rx) = session();
        session.open().unwrap();
        assert_eq!(session.state(), SessionState::StatusSent);

        let frame = wire_rx.try_recv().unwrap();
        let OutboundFrame::Message(bytes) = frame else { panic!("expected message frame") };
        let decoded = ProtocolMessage::decode(&mut &bytes[..]).unwrap();
        assert_eq!(decoded.message_id, EthMessageID::Status);
        assert_eq!(decoded.message, EthMessage::Status(local_status()));
    }

    #[test]
    fn handshake_completes_on_matching_status() {
        let (session, _wire_rx) = active_session();
        assert_eq!(session.peer_status(), Some(&peer_status()));
    }

    #[test]
    fn disconnects_on_non_status_first_message() {
        let (mut session, mut wire_rx) = session();
        session.open().unwrap();
        let _ = wire_rx.try_recv().unwrap();

        let frame = encode(EthMessage::GetBlockBodies(GetBlockBodies(vec![])));
        assert_matches!(session.on_frame(&frame), SessionOutcome::Disconnected(_));
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn disconnects_on_wrong_network_id() {
        let (mut session, mut wire_rx) = session();
        session.open().unwrap();
        let _ = wire_rx.try_recv().unwrap();

        let status = Status { network_id: 2222, ..peer_status() };
        assert_matches!(
            session.on_frame(&encode(EthMessage::Status(status))),
            SessionOutcome::Disconnected(_)
        );
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn disconnects_on_wrong_genesis_hash() {
        let (mut session, mut wire_rx) = session();
        session.open().unwrap();
        let _ = wire_rx.try_recv().unwrap();

        let status = Status { genesis_hash: B256::repeat_byte(0x99), ..peer_status() };
        assert_matches!(
            session.on_frame(&encode(EthMessage::Status(status))),
            SessionOutcome::Disconnected(_)
        );
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn disconnects_on_malformed_frame() {
        let (mut session, mut wire_rx) = active_session();

        // a GetBlockHeaders id with garbage payload
        let mut frame = vec![EthMessageID::GetBlockHeaders.to_u8()];
        frame.extend([0xc5, 0x01]);
        assert_matches!(session.on_frame(&frame), SessionOutcome::Disconnected(_));
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn disconnects_on_unsolicited_response() {
        let (mut session, mut wire_rx) = active_session();

        let frame = encode(EthMessage::BlockHeaders(BlockHeaders(vec![])));
        assert_matches!(session.on_frame(&frame), SessionOutcome::Disconnected(_));
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn disconnects_on_status_after_handshake() {
        let (mut session, mut wire_rx) = active_session();

        let frame = encode(EthMessage::Status(peer_status()));
        assert_matches!(session.on_frame(&frame), SessionOutcome::Disconnected(_));
        assert_disconnected_with(&session, &mut wire_rx, DisconnectReason::BreachOfProtocol);
    }

    #[test]
    fn requests_are_dispatched_when_active() {
        let (mut session, _wire_rx) = active_session();

        let frame = encode(EthMessage::GetBlockBodies(GetBlockBodies(vec![B256::ZERO])));
        assert_matches!(
            session.on_frame(&frame),
            SessionOutcome::Request(EthMessage::GetBlockBodies(_))
        );
    }

    #[test]
    fn gossip_is_ignored() {
        let (mut session, _wire_rx) = active_session();

        let frame = encode(EthMessage::NewBlockHashes(Default::default()));
        assert_matches!(session.on_frame(&frame), SessionOutcome::Continue);
        assert!(session.is_active());
    }

    #[test]
    fn headers_response_resolves_pending_request() {
        let (mut session, _wire_rx) = active_session();

        let (tx, mut rx) = oneshot::channel();
        let request = GetBlockHeaders {
            start_block: 9u64.into(),
            max_headers: 10,
            skip: 0,
            direction: basalt_primitives::HeadersDirection::Falling,
        };
        session.request_headers(request, tx).unwrap();

        let header = Header { number: 9, ..Default::default() };
        let frame = encode(EthMessage::BlockHeaders(BlockHeaders(vec![header.clone()])));
        assert_matches!(session.on_frame(&frame), SessionOutcome::Continue);
        assert_eq!(rx.try_recv().unwrap(), Ok(vec![header]));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut session, mut wire_rx) = active_session();

        session.disconnect(DisconnectReason::UselessPeer);
        session.disconnect(DisconnectReason::TooManyPeers);
        assert_eq!(session.state(), SessionState::Disconnected(DisconnectReason::UselessPeer));

        // exactly one disconnect frame went out
        let mut reasons = Vec::new();
        while let Ok(frame) = wire_rx.try_recv() {
            if let OutboundFrame::Disconnect(reason) = frame {
                reasons.push(reason);
            }
        }
        assert_eq!(reasons, vec![DisconnectReason::UselessPeer]);
    }

    #[test]
    fn send_after_transport_gone_is_peer_gone() {
        let (mut session, wire_rx) = active_session();
        drop(wire_rx);

        let result = session.send_message(EthMessage::BlockHeaders(BlockHeaders(vec![])));
        assert_eq!(result, Err(PeerGone));
        assert_eq!(
            session.state(),
            SessionState::Disconnected(DisconnectReason::RemoteConnectionReset)
        );
    }

    #[test]
    fn pending_requests_fail_on_disconnect() {
        let (mut session, _wire_rx) = active_session();

        let (tx, mut rx) = oneshot::channel();
        let request = GetBlockHeaders {
            start_block: 4u64.into(),
            max_headers: 5,
            skip: 0,
            direction: basalt_primitives::HeadersDirection::Falling,
        };
        session.request_headers(request, tx).unwrap();
        session.disconnect(DisconnectReason::ClientQuit);

        assert_eq!(rx.try_recv().unwrap(), Err(RequestError::ConnectionDropped));
    }

}
