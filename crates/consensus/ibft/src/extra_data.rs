use alloy_primitives::{Address, Bytes};
use alloy_rlp::{length_of_length, Decodable, Encodable, EMPTY_STRING_CODE};
use basalt_interfaces::consensus::ConsensusError;
use basalt_primitives::{Header, Signature};

/// The fixed length of the vanity prefix inside the extra data.
pub const EXTRA_VANITY_LENGTH: usize = 32;

/// The consensus payload carried in the `extra_data` field of IBFT-legacy
/// headers.
///
/// Encodes to a single RLP list
/// `[vanity, [seal, ...], proposer_seal, [validator, ...]]`; an absent
/// proposer seal is encoded as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbftExtraData {
    /// 32 bytes of arbitrary proposer vanity.
    pub vanity: Bytes,
    /// The commit seals collected for this block.
    pub seals: Vec<Signature>,
    /// The proposer's signature over the signature-free header hash.
    pub proposer_seal: Option<Signature>,
    /// The validator set in effect at this block.
    pub validators: Vec<Address>,
}

// === impl IbftExtraData ===

impl IbftExtraData {
    /// The payload of a fresh proposal: zero vanity, no seals yet and the
    /// supplied validator set.
    pub fn proposal(validators: Vec<Address>) -> Self {
        Self {
            vanity: Bytes::from_static(&[0u8; EXTRA_VANITY_LENGTH]),
            seals: Vec::new(),
            proposer_seal: None,
            validators,
        }
    }

    /// Returns the payload with the given proposer seal attached.
    pub fn with_proposer_seal(mut self, seal: Signature) -> Self {
        self.proposer_seal = Some(seal);
        self
    }

    /// Returns the payload with the proposer seal and the commit seals
    /// removed, the form hashed for the proposer signature.
    pub fn unsigned(&self) -> Self {
        Self {
            vanity: self.vanity.clone(),
            seals: Vec::new(),
            proposer_seal: None,
            validators: self.validators.clone(),
        }
    }

    /// Returns the payload with only the proposer seal removed, the form
    /// hashed for the chain-active block identity.
    pub fn without_proposer_seal(&self) -> Self {
        Self { proposer_seal: None, ..self.clone() }
    }

    /// Encodes the payload into the byte string placed in
    /// `header.extra_data`.
    pub fn encoded(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out.into()
    }

    /// Decodes the payload out of the given header's extra data.
    pub fn decode_from_header(header: &Header) -> Result<Self, ConsensusError> {
        Self::decode(&mut header.extra_data.as_ref())
            .map_err(|_| ConsensusError::InvalidExtraData)
    }

    fn payload_length(&self) -> usize {
        let seals: Vec<Seal> = self.seals.iter().copied().map(Seal).collect();
        self.vanity.length() +
            seals.length() +
            ProposerSeal(self.proposer_seal).length() +
            self.validators.length()
    }
}

impl Encodable for IbftExtraData {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let seals: Vec<Seal> = self.seals.iter().copied().map(Seal).collect();
        alloy_rlp::Header { list: true, payload_length: self.payload_length() }.encode(out);
        self.vanity.encode(out);
        seals.encode(out);
        ProposerSeal(self.proposer_seal).encode(out);
        self.validators.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for IbftExtraData {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = alloy_rlp::Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }

        let vanity = Bytes::decode(buf)?;
        if vanity.len() != EXTRA_VANITY_LENGTH {
            return Err(alloy_rlp::Error::Custom("ibft vanity must be 32 bytes"))
        }
        let seals = Vec::<Seal>::decode(buf)?.into_iter().map(|seal| seal.0).collect();
        let proposer_seal = ProposerSeal::decode(buf)?.0;
        let validators = Vec::<Address>::decode(buf)?;

        Ok(Self { vanity, seals, proposer_seal, validators })
    }
}

/// A commit or proposer seal on the wire: the 65 raw signature bytes as an
/// RLP string.
struct Seal(Signature);

impl Encodable for Seal {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.to_raw_bytes().as_slice().encode(out)
    }

    fn length(&self) -> usize {
        self.0.to_raw_bytes().as_slice().length()
    }
}

impl Decodable for Seal {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let raw = Bytes::decode(buf)?;
        Signature::from_raw_bytes(&raw)
            .map(Seal)
            .ok_or(alloy_rlp::Error::Custom("seal must be 65 signature bytes"))
    }
}

/// The optional proposer seal slot; absent is the empty string.
struct ProposerSeal(Option<Signature>);

impl Encodable for ProposerSeal {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self.0 {
            Some(seal) => seal.to_raw_bytes().as_slice().encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match self.0 {
            Some(seal) => seal.to_raw_bytes().as_slice().length(),
            None => 1,
        }
    }
}

impl Decodable for ProposerSeal {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        if buf.first() == Some(&EMPTY_STRING_CODE) {
            *buf = &buf[1..];
            return Ok(Self(None))
        }
        Ok(Self(Some(Seal::decode(buf)?.0)))
    }
}
