//! Types for the eth wire protocol messages.

mod blocks;
mod broadcast;
mod receipts;
mod state;

pub use blocks::{BlockBodies, BlockHeaders, GetBlockBodies, GetBlockHeaders};
pub use broadcast::{BlockHashNumber, NewBlock, NewBlockHashes, Transactions};
pub use receipts::{GetReceipts, Receipts};
pub use state::{GetNodeData, NodeData};
