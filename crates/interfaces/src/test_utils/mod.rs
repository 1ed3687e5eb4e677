//! Testing support for the networking and download interfaces.

mod chain;
pub mod generators;
mod headers;

pub use chain::TestChain;
pub use headers::{ScriptedResponse, TestHeadersClient};
