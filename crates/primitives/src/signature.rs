use alloy_primitives::{keccak256, Address, B256, U256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};

/// An ECDSA signature over the secp256k1 curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    /// The R field of the signature.
    pub r: U256,
    /// The S field of the signature.
    pub s: U256,
    /// The parity of the Y coordinate of the public key.
    pub odd_y_parity: bool,
}

// === impl Signature ===

impl Signature {
    /// Returns the 65-byte raw form of the signature: `r || s || recovery id`.
    pub fn to_raw_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = self.odd_y_parity as u8;
        out
    }

    /// Parses a signature from its 65-byte raw form.
    ///
    /// Returns `None` when the slice has the wrong length or carries a
    /// recovery id other than 0 or 1.
    pub fn from_raw_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 65 || bytes[64] > 1 {
            return None
        }
        Some(Self {
            r: U256::from_be_slice(&bytes[..32]),
            s: U256::from_be_slice(&bytes[32..64]),
            odd_y_parity: bytes[64] == 1,
        })
    }

    /// Recover the address that produced this signature over the given
    /// message digest. Returns `None` for unrecoverable signatures.
    pub fn recover_signer(&self, message: B256) -> Option<Address> {
        recover_signer(self, message)
    }
}

/// Signs the given message digest with the secret key, producing a
/// recoverable [`Signature`].
pub fn sign_message(secret: &SecretKey, message: B256) -> Result<Signature, secp256k1::Error> {
    let digest = Message::from_digest(message.0);
    let signature = SECP256K1.sign_ecdsa_recoverable(&digest, secret);
    let (rec_id, data) = signature.serialize_compact();
    Ok(Signature {
        r: U256::from_be_slice(&data[..32]),
        s: U256::from_be_slice(&data[32..]),
        odd_y_parity: rec_id.to_i32() != 0,
    })
}

/// Recovers the address of the key that signed the given message digest.
pub fn recover_signer(signature: &Signature, message: B256) -> Option<Address> {
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r.to_be_bytes::<32>());
    compact[32..].copy_from_slice(&signature.s.to_be_bytes::<32>());
    let rec_id = RecoveryId::from_i32(signature.odd_y_parity as i32).ok()?;
    let signature = RecoverableSignature::from_compact(&compact, rec_id).ok()?;

    let digest = Message::from_digest(message.0);
    let public = SECP256K1.recover_ecdsa(&digest, &signature).ok()?;
    Some(public_key_to_address(&public))
}

/// Converts a secp256k1 public key to an Ethereum address: the last 20 bytes
/// of the keccak hash of the uncompressed key.
pub fn public_key_to_address(public: &PublicKey) -> Address {
    let hash = keccak256(&public.serialize_uncompressed()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::rand::thread_rng;

    #[test]
    fn sign_and_recover() {
        let (secret, public) = SECP256K1.generate_keypair(&mut thread_rng());
        let message = keccak256(b"sealable header bytes");

        let signature = sign_message(&secret, message).unwrap();
        let recovered = recover_signer(&signature, message).unwrap();
        assert_eq!(recovered, public_key_to_address(&public));
    }

    #[test]
    fn raw_bytes_roundtrip() {
        let (secret, _) = SECP256K1.generate_keypair(&mut thread_rng());
        let signature = sign_message(&secret, keccak256(b"raw")).unwrap();

        let raw = signature.to_raw_bytes();
        assert_eq!(Signature::from_raw_bytes(&raw), Some(signature));
        assert_eq!(Signature::from_raw_bytes(&raw[..64]), None);
    }
}
