#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! The eth sub-protocol layer of basalt: per-peer sessions with the eth/63
//! handshake, the server answering block data requests out of the chain
//! store, new-block fan-out to authenticated peers and the fetch client used
//! by the downloaders to acquire peers.

pub mod config;
mod error;
pub mod eth_requests;
pub mod fetch;
pub mod import;
pub mod peers;
pub mod session;

pub use config::{IbftOptions, NetworkConfig};
pub use error::PeerGone;
pub use eth_requests::{EthRequestHandler, IncomingEthRequest};
pub use fetch::FetchClient;
pub use import::BlockPropagator;
pub use peers::{OutboundFrame, PeerCommand, PeerHandle, PeerRegistry, PeersHandle};
pub use session::{drive_session, PeerSession, SessionOutcome, SessionState};
