#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! Implementation of the `eth` wire protocol as spoken on IBFT-legacy
//! networks: the eth/63 message set, also advertised as `istanbul/64`.
//!
//! The outer RLPx framing is handled by the transport; this crate covers the
//! sub-protocol payloads, their one-byte message ids and the handshake
//! `Status` exchange.

mod disconnect;
pub mod errors;
mod message;
mod status;
pub mod types;
mod version;

pub use disconnect::{DisconnectReason, UnknownDisconnectReason};
pub use errors::{EthHandshakeError, EthStreamError};
pub use message::{EthMessage, EthMessageID, ProtocolMessage};
pub use status::{Status, StatusBuilder};
pub use types::*;
pub use version::{Capability, SubProtocol};
