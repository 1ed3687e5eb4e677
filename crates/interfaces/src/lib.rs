#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! Traits and shared abstractions that glue the basalt components together:
//! the chain read model, the consensus seam, the p2p request/download error
//! taxonomy and the headers client used by the downloaders.

pub mod consensus;
pub mod events;
pub mod p2p;
pub mod provider;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
