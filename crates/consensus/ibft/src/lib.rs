#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
//! IBFT-legacy consensus glue: the validator payload carried in the header's
//! extra data, the signature-free header hashing it requires, candidate
//! block construction for the local proposer and the attached validation
//! ruleset, plus the bridge that feeds chain events into the consensus
//! event queue.

mod extra_data;
mod hashing;
mod observer;
mod proposer;
mod validation;

pub use extra_data::{IbftExtraData, EXTRA_VANITY_LENGTH};
pub use hashing::{hash_for_proposer_seal, IbftHashFunction};
pub use observer::{IbftChainObserver, IbftEvent, IbftEventQueue};
pub use proposer::{GasLimitPolicy, IbftBlockProposer, IBFT_DIFFICULTY, IBFT_MIX_HASH};
pub use validation::IbftConsensus;
