//! Generators for random chain data used across the test suites.

use basalt_primitives::{
    Address, BlockBody, Bytes, Header, Log, Receipt, SealedHeader, TransactionKind,
    TransactionSigned, B256, B64, U256,
};

/// Generate a random [SealedHeader].
///
/// The header is assumed to not be correct if validated.
pub fn random_header(number: u64, parent: Option<B256>) -> SealedHeader {
    let header = Header {
        number,
        nonce: B64::from(rand::random::<[u8; 8]>()),
        difficulty: U256::from(rand::random::<u32>()),
        parent_hash: parent.unwrap_or_default(),
        gas_limit: 5000,
        ..Default::default()
    };
    header.seal_slow()
}

/// Generates a range of random [SealedHeader]s linked by parent hash.
///
/// The parent hash of the first header in the result will be equal to
/// `head`.
pub fn random_header_range(range: std::ops::Range<u64>, head: B256) -> Vec<SealedHeader> {
    let mut headers = Vec::with_capacity(range.end.saturating_sub(range.start) as usize);
    for number in range {
        headers.push(random_header(
            number,
            Some(headers.last().map(|h: &SealedHeader| h.hash()).unwrap_or(head)),
        ));
    }
    headers
}

/// Generate a random block hash.
pub fn random_hash() -> B256 {
    B256::from(rand::random::<[u8; 32]>())
}

/// Generate a random signed legacy transaction.
///
/// The signature is random bytes and will not recover to a sender.
pub fn random_tx() -> TransactionSigned {
    TransactionSigned {
        nonce: rand::random::<u16>() as u64,
        gas_price: rand::random::<u32>() as u128,
        gas_limit: 21_000,
        to: TransactionKind::Call(Address::from(rand::random::<[u8; 20]>())),
        value: U256::from(rand::random::<u32>()),
        input: Bytes::default(),
        v: 27,
        r: U256::from(rand::random::<u64>()),
        s: U256::from(rand::random::<u64>()),
    }
}

/// Generate a block body with the given number of random transactions.
pub fn random_body(tx_count: usize) -> BlockBody {
    BlockBody {
        transactions: (0..tx_count).map(|_| random_tx()).collect(),
        ommers: Vec::new(),
    }
}

/// Generate a receipt with a single random log.
pub fn random_receipt(cumulative_gas_used: u64) -> Receipt {
    Receipt {
        success: true,
        cumulative_gas_used,
        logs_bloom: Default::default(),
        logs: vec![Log {
            address: Address::from(rand::random::<[u8; 20]>()),
            topics: vec![random_hash()],
            data: Bytes::default(),
        }],
    }
}
