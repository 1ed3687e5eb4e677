use std::{borrow::Cow, fmt};

/// A protocol capability as advertised during the RLPx hello exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    /// The name of the sub-protocol.
    pub name: Cow<'static, str>,
    /// The version of the sub-protocol.
    pub version: u8,
}

// === impl Capability ===

impl Capability {
    /// Constructs a new capability.
    pub fn new(name: impl Into<Cow<'static, str>>, version: u8) -> Self {
        Self { name: name.into(), version }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// The sub-protocol flavors this node can speak.
///
/// Both use the same message set and codes; Ottoman-era IBFT networks
/// advertise the set under the `istanbul` capability name instead of `eth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubProtocol {
    /// `eth` version 63.
    #[default]
    Eth63,
    /// `istanbul` version 64, the eth/63 message set under the Istanbul
    /// capability.
    Istanbul64,
}

// === impl SubProtocol ===

impl SubProtocol {
    /// The capability name advertised on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            SubProtocol::Eth63 => "eth",
            SubProtocol::Istanbul64 => "istanbul",
        }
    }

    /// The capability version advertised on the wire.
    pub const fn version(&self) -> u8 {
        match self {
            SubProtocol::Eth63 => 63,
            SubProtocol::Istanbul64 => 64,
        }
    }

    /// The protocol version carried in the `Status` message.
    pub const fn status_version(&self) -> u32 {
        self.version() as u32
    }

    /// The advertised [`Capability`].
    pub fn capability(&self) -> Capability {
        Capability::new(self.name(), self.version())
    }
}

impl fmt::Display for SubProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.capability())
    }
}
