use alloy_primitives::B512;

/// The identifier of a remote peer: its uncompressed public key.
pub type PeerId = B512;

/// A value paired with the id of the peer it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithPeerId<T>(PeerId, T);

// === impl WithPeerId ===

impl<T> WithPeerId<T> {
    /// Wraps the value with the peer id.
    pub fn new(peer: PeerId, value: T) -> Self {
        Self(peer, value)
    }

    /// Returns the peer id.
    pub fn peer_id(&self) -> PeerId {
        self.0
    }

    /// Returns a reference to the inner value.
    pub fn data(&self) -> &T {
        &self.1
    }

    /// Consumes the wrapper, returning the inner value.
    pub fn into_data(self) -> T {
        self.1
    }

    /// Splits the wrapper into its parts.
    pub fn split(self) -> (PeerId, T) {
        (self.0, self.1)
    }
}

impl<T> From<(PeerId, T)> for WithPeerId<T> {
    fn from((peer, value): (PeerId, T)) -> Self {
        Self(peer, value)
    }
}
