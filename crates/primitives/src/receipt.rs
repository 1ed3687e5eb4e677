use alloy_primitives::{Address, Bloom, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// A log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Log {
    /// The address that emitted the log.
    pub address: Address,
    /// The indexed topics of the log.
    pub topics: Vec<B256>,
    /// The unindexed payload of the log.
    pub data: Bytes,
}

/// The receipt of an executed transaction.
///
/// Post-Byzantium form: the first field is the execution status rather than
/// an intermediate state root.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct Receipt {
    /// Whether the transaction executed successfully.
    pub success: bool,
    /// The total amount of gas used in the block up to and including this
    /// transaction.
    pub cumulative_gas_used: u64,
    /// The bloom filter of the logs.
    pub logs_bloom: Bloom,
    /// The logs emitted by the transaction.
    pub logs: Vec<Log>,
}
