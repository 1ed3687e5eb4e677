//! End-to-end exercise of a session: handshake, request serving, header
//! fetching and disconnect.

use basalt_eth_wire::{
    DisconnectReason, EthMessage, EthMessageID, ProtocolMessage, Status, SubProtocol,
};
use basalt_interfaces::{
    p2p::headers::{HeadersClient, HeadersRequest},
    provider::{BlockProvider, HeaderProvider, NodeDataUnsupported},
    test_utils::TestChain,
};
use basalt_network::{
    drive_session, EthRequestHandler, FetchClient, OutboundFrame, PeerCommand, PeerHandle,
    PeerRegistry, PeerSession,
};
use basalt_primitives::{HeadersDirection, PeerId, U256};
use std::sync::Arc;
use tokio::sync::mpsc;

fn encode(message: EthMessage) -> bytes::Bytes {
    ProtocolMessage::from(message).encoded()
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> ProtocolMessage {
    match rx.recv().await.expect("wire closed") {
        OutboundFrame::Message(frame) => ProtocolMessage::decode(&mut &frame[..]).unwrap(),
        OutboundFrame::Disconnect(reason) => panic!("unexpected disconnect: {reason}"),
    }
}

#[tokio::test]
async fn session_serves_requests_and_fetches_headers() {
    let chain = Arc::new(TestChain::with_head(20));
    let genesis = chain.genesis_hash().unwrap();
    let head = chain.chain_head().unwrap();

    let local_status = Status {
        version: 63,
        network_id: 1,
        total_difficulty: head.total_difficulty,
        head_hash: head.hash(),
        genesis_hash: genesis,
    };
    let peer_status = Status { total_difficulty: U256::from(1u64), ..local_status };

    let registry = PeerRegistry::new();
    let peer_id = PeerId::repeat_byte(0x0a);

    let (to_wire, mut wire_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (srv_tx, srv_rx) = mpsc::unbounded_channel();

    let handler =
        EthRequestHandler::new(Arc::clone(&chain), Arc::new(NodeDataUnsupported::default()), 192, srv_rx);
    tokio::spawn(handler);

    let handle = PeerHandle::new(peer_id, to_wire.clone(), cmd_tx.clone());
    let session = PeerSession::new(peer_id, SubProtocol::Eth63, local_status, to_wire);
    let driver = tokio::spawn(drive_session(
        session,
        inbound_rx,
        cmd_rx,
        srv_tx,
        registry.clone(),
        handle,
    ));

    // The local status goes out before anything else.
    let first = next_message(&mut wire_rx).await;
    assert_eq!(first.message_id, EthMessageID::Status);

    // Complete the handshake.
    inbound_tx.send(encode(EthMessage::Status(peer_status))).unwrap();

    // Ask for headers 5..=9 and check the served response.
    let request = basalt_eth_wire::GetBlockHeaders {
        start_block: 5u64.into(),
        max_headers: 5,
        skip: 0,
        direction: HeadersDirection::Rising,
    };
    inbound_tx.send(encode(EthMessage::GetBlockHeaders(request))).unwrap();

    let response = next_message(&mut wire_rx).await;
    let EthMessage::BlockHeaders(headers) = response.message else {
        panic!("expected BlockHeaders")
    };
    let numbers: Vec<_> = headers.0.iter().map(|h| h.number).collect();
    assert_eq!(numbers, vec![5, 6, 7, 8, 9]);

    // The authenticated session is in the registry by now.
    let peers = registry.handle();
    assert_eq!(peers.peer_count(), 1);

    // Fetch headers through the client; the driver turns the request into a
    // wire frame that the fake remote answers.
    let client = FetchClient::new(peers);
    let fetch = client.get_headers(
        HeadersRequest { start: 9u64.into(), limit: 3, direction: HeadersDirection::Falling },
        None,
    );
    let fetch = tokio::spawn(fetch);

    let outbound = next_message(&mut wire_rx).await;
    let EthMessage::GetBlockHeaders(sent) = outbound.message else {
        panic!("expected GetBlockHeaders")
    };
    assert_eq!(sent.max_headers, 3);
    assert!(sent.direction.is_falling());

    let reply: Vec<_> = (7..=9)
        .rev()
        .map(|n| chain.header_by_number(n).unwrap().unwrap())
        .collect();
    inbound_tx.send(encode(EthMessage::BlockHeaders(reply.into()))).unwrap();

    let fetched = fetch.await.unwrap().unwrap();
    assert_eq!(fetched.peer_id(), peer_id);
    assert_eq!(fetched.data().len(), 3);

    // Disconnect through the command channel; the reason reaches the wire
    // and the registry forgets the peer.
    cmd_tx.send(PeerCommand::Disconnect(DisconnectReason::UselessPeer)).unwrap();
    driver.await.unwrap();

    let mut last = None;
    while let Ok(frame) = wire_rx.try_recv() {
        last = Some(frame);
    }
    assert_eq!(last, Some(OutboundFrame::Disconnect(DisconnectReason::UselessPeer)));
    assert_eq!(registry.handle().peer_count(), 0);
}

#[tokio::test]
async fn session_disconnects_peer_with_wrong_network() {
    let chain = Arc::new(TestChain::with_head(5));
    let genesis = chain.genesis_hash().unwrap();

    let local_status = Status {
        version: 63,
        network_id: 1,
        total_difficulty: U256::from(1u64),
        head_hash: genesis,
        genesis_hash: genesis,
    };

    let registry = PeerRegistry::new();
    let peer_id = PeerId::repeat_byte(0x0b);

    let (to_wire, mut wire_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (srv_tx, _srv_rx) = mpsc::unbounded_channel();

    let handle = PeerHandle::new(peer_id, to_wire.clone(), cmd_tx);
    let session = PeerSession::new(peer_id, SubProtocol::Eth63, local_status, to_wire);
    let driver = tokio::spawn(drive_session(
        session,
        inbound_rx,
        cmd_rx,
        srv_tx,
        registry.clone(),
        handle,
    ));

    let bad_status = Status { network_id: 2222, ..local_status };
    inbound_tx.send(encode(EthMessage::Status(bad_status))).unwrap();
    driver.await.unwrap();

    let mut frames = Vec::new();
    while let Ok(frame) = wire_rx.try_recv() {
        frames.push(frame);
    }
    assert_eq!(
        frames.last(),
        Some(&OutboundFrame::Disconnect(DisconnectReason::BreachOfProtocol))
    );
    assert_eq!(registry.handle().peer_count(), 0);
}
