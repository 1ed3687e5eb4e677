//! Fan-out of newly sealed blocks to every authenticated peer.

use crate::peers::{OutboundFrame, PeersHandle};
use basalt_eth_wire::{EthMessage, NewBlock, ProtocolMessage};
use basalt_primitives::{SealedBlock, U256};
use tracing::trace;

/// Announces newly mined blocks to all authenticated peers.
#[derive(Debug, Clone)]
pub struct BlockPropagator {
    peers: PeersHandle,
}

// === impl BlockPropagator ===

impl BlockPropagator {
    /// Creates a propagator over the given peer set.
    pub fn new(peers: PeersHandle) -> Self {
        Self { peers }
    }

    /// Sends `NEW_BLOCK` to every authenticated peer.
    ///
    /// The message is encoded once and enqueued on each peer's outbound
    /// channel, keeping per-peer FIFO with pending responses. A gone peer is
    /// skipped; it never stops the fan-out.
    pub fn on_block_mined(&self, block: SealedBlock, total_difficulty: U256) {
        let number = block.header.number;
        let hash = block.header.hash();
        let message = NewBlock { block: block.unseal(), total_difficulty };
        let frame = ProtocolMessage::from(EthMessage::NewBlock(Box::new(message))).encoded();

        let mut sent = 0usize;
        for peer in self.peers.iter_peers() {
            if peer.send_frame(OutboundFrame::Message(frame.clone())).is_err() {
                trace!(
                    target: "net",
                    peer = %peer.peer_id(),
                    "peer gone during block propagation"
                );
                continue
            }
            sent += 1;
        }
        trace!(target: "net", number, %hash, peers = sent, "announced new block");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::{PeerHandle, PeerRegistry};
    use basalt_primitives::{Header, PeerId};
    use tokio::sync::mpsc;

    fn register_peer(
        registry: &PeerRegistry,
        id: u8,
    ) -> mpsc::UnboundedReceiver<OutboundFrame> {
        let (to_wire, wire_rx) = mpsc::unbounded_channel();
        let (to_session, _session_rx) = mpsc::unbounded_channel();
        registry.register(PeerHandle::new(PeerId::repeat_byte(id), to_wire, to_session));
        wire_rx
    }

    #[test]
    fn fans_out_to_every_peer() {
        let registry = PeerRegistry::new();
        let mut receivers: Vec<_> = (1..=5).map(|id| register_peer(&registry, id)).collect();

        let block = SealedBlock {
            header: Header { number: 42, ..Default::default() }.seal_slow(),
            body: Default::default(),
        };
        let total_difficulty = U256::from(0x4242u64);
        let propagator = BlockPropagator::new(registry.handle());
        propagator.on_block_mined(block.clone(), total_difficulty);

        for rx in &mut receivers {
            let OutboundFrame::Message(frame) = rx.try_recv().unwrap() else {
                panic!("expected message frame")
            };
            // exactly one frame per peer
            assert!(rx.try_recv().is_err());

            let decoded = ProtocolMessage::decode(&mut &frame[..]).unwrap();
            let EthMessage::NewBlock(new_block) = decoded.message else {
                panic!("expected NewBlock")
            };
            assert_eq!(new_block.total_difficulty, total_difficulty);
            assert_eq!(new_block.block.header.number, 42);
        }
    }

    #[test]
    fn gone_peer_does_not_stop_fan_out() {
        let registry = PeerRegistry::new();
        let rx1 = register_peer(&registry, 1);
        let mut rx2 = register_peer(&registry, 2);
        drop(rx1);

        let block = SealedBlock {
            header: Header { number: 7, ..Default::default() }.seal_slow(),
            body: Default::default(),
        };
        let propagator = BlockPropagator::new(registry.handle());
        propagator.on_block_mined(block, U256::from(1u64));

        assert!(rx2.try_recv().is_ok());
    }
}
