//! Shared abstractions for p2p requests and downloads.

pub mod error;
pub mod headers;
