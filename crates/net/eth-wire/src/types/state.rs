//! Implements the `GetNodeData` and `NodeData` message types.

use alloy_primitives::{Bytes, B256};
use alloy_rlp::{RlpDecodableWrapper, RlpEncodableWrapper};

/// A request for state tree nodes or contract code corresponding to the
/// given hashes.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct GetNodeData(
    /// The hashes of the state entries being requested.
    pub Vec<B256>,
);

/// The response to [`GetNodeData`].
///
/// Not all entries are guaranteed to be returned by the peer.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodableWrapper, RlpDecodableWrapper)]
pub struct NodeData(
    /// The raw state entries that resolved.
    pub Vec<Bytes>,
);

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::{Decodable, Encodable};

    #[test]
    fn node_data_roundtrip() {
        let response =
            NodeData(vec![Bytes::from_static(&[0xde, 0xad]), Bytes::from_static(&[0xbe, 0xef])]);
        let mut encoded = Vec::new();
        response.encode(&mut encoded);
        assert_eq!(NodeData::decode(&mut encoded.as_slice()).unwrap(), response);
    }
}
