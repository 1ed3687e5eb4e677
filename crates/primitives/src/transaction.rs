use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable, EMPTY_STRING_CODE};

/// Whether or not the transaction is a contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionKind {
    /// A transaction that creates a contract.
    #[default]
    Create,
    /// A transaction that calls a contract or transfers value.
    Call(Address),
}

impl Encodable for TransactionKind {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self {
            TransactionKind::Call(to) => to.encode(out),
            TransactionKind::Create => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match self {
            TransactionKind::Call(to) => to.length(),
            TransactionKind::Create => 1,
        }
    }
}

impl Decodable for TransactionKind {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        match buf.first() {
            Some(&EMPTY_STRING_CODE) => {
                *buf = &buf[1..];
                Ok(TransactionKind::Create)
            }
            Some(_) => Ok(TransactionKind::Call(Address::decode(buf)?)),
            None => Err(alloy_rlp::Error::InputTooShort),
        }
    }
}

/// A signed legacy transaction.
///
/// The wire encoding is the canonical nine-field RLP list. Typed transaction
/// envelopes never appear on IBFT-legacy chains, so no discriminating prefix
/// is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
pub struct TransactionSigned {
    /// A scalar value equal to the number of transactions sent by the sender.
    pub nonce: u64,
    /// A scalar value equal to the number of Wei to be paid per unit of gas.
    pub gas_price: u128,
    /// A scalar value equal to the maximum amount of gas that should be used
    /// in executing this transaction.
    pub gas_limit: u64,
    /// The 160-bit address of the message call's recipient, or empty for a
    /// contract creation.
    pub to: TransactionKind,
    /// A scalar value equal to the number of Wei to be transferred to the
    /// message call's recipient.
    pub value: U256,
    /// The input data of the message call.
    pub input: Bytes,
    /// The recovery id of the signature, including the chain id for
    /// EIP-155-protected transactions.
    pub v: u64,
    /// The R field of the signature.
    pub r: U256,
    /// The S field of the signature.
    pub s: U256,
}
