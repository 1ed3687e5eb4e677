//! Configuration of the networking layer.

use basalt_eth_wire::{Status, SubProtocol};
use basalt_interfaces::provider::ChainHead;
use basalt_primitives::B256;
use std::time::Duration;

/// The default cap on items served per response, applied uniformly to
/// headers, bodies, receipts and node-data entries.
pub const DEFAULT_REQUEST_LIMIT: u16 = 192;

/// The default number of parallel download tasks the synchronizer runs.
pub const DEFAULT_DOWNLOADER_PARALLELISM: u16 = 4;

/// The default timeout for a single outstanding peer request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(8000);

/// The default number of attempts a download makes before giving up.
pub const DEFAULT_MAX_RETRIES: u16 = 3;

/// All network related initialization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The id of the network to participate in.
    pub network_id: u64,
    /// Cap on items per response, applied uniformly to headers, bodies,
    /// receipts and node-data entries.
    pub max_items_per_response: u16,
    /// How many download tasks the synchronizer may run concurrently.
    pub downloader_parallelism: u16,
    /// Timeout for a single outstanding peer request.
    pub request_timeout: Duration,
    /// Number of attempts a download makes before giving up.
    pub max_retries: u16,
    /// Whether the node syncs block data ahead of full validation.
    pub fast_sync: bool,
    /// The sub-protocol flavor to advertise.
    pub sub_protocol: SubProtocol,
    /// IBFT consensus options.
    pub ibft: IbftOptions,
}

// === impl NetworkConfig ===

impl NetworkConfig {
    /// Creates the config for the given network id with all defaults.
    pub fn new(network_id: u64) -> Self {
        Self {
            network_id,
            max_items_per_response: DEFAULT_REQUEST_LIMIT,
            downloader_parallelism: DEFAULT_DOWNLOADER_PARALLELISM,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            fast_sync: false,
            sub_protocol: SubProtocol::default(),
            ibft: IbftOptions::default(),
        }
    }

    /// Returns a builder seeded with the defaults for the network id.
    pub fn builder(network_id: u64) -> NetworkConfigBuilder {
        NetworkConfigBuilder { config: Self::new(network_id) }
    }

    /// Derives the local handshake [`Status`] for the current chain state.
    pub fn local_status(&self, genesis_hash: B256, head: &ChainHead) -> Status {
        Status::builder()
            .protocol(self.sub_protocol)
            .network_id(self.network_id)
            .total_difficulty(head.total_difficulty)
            .head_hash(head.hash())
            .genesis_hash(genesis_hash)
            .build()
    }
}

/// Builder for [`NetworkConfig`].
#[derive(Debug)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

// === impl NetworkConfigBuilder ===

impl NetworkConfigBuilder {
    /// Sets the response item cap.
    pub fn max_items_per_response(mut self, limit: u16) -> Self {
        self.config.max_items_per_response = limit;
        self
    }

    /// Sets the downloader parallelism.
    pub fn downloader_parallelism(mut self, parallelism: u16) -> Self {
        self.config.downloader_parallelism = parallelism;
        self
    }

    /// Sets the peer request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the download retry bound.
    pub fn max_retries(mut self, max_retries: u16) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Enables or disables fast sync.
    pub fn fast_sync(mut self, fast_sync: bool) -> Self {
        self.config.fast_sync = fast_sync;
        self
    }

    /// Sets the advertised sub-protocol.
    pub fn sub_protocol(mut self, sub_protocol: SubProtocol) -> Self {
        self.config.sub_protocol = sub_protocol;
        self
    }

    /// Sets the IBFT options.
    pub fn ibft(mut self, ibft: IbftOptions) -> Self {
        self.config.ibft = ibft;
        self
    }

    /// Builds the config.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}

/// Options of the IBFT consensus layer carried in the node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbftOptions {
    /// The block interval at whose boundary vote tallies are reset.
    pub epoch_length: u64,
    /// How long a consensus round waits before firing a round-change.
    pub request_timeout: Duration,
}

impl Default for IbftOptions {
    fn default() -> Self {
        Self { epoch_length: 30_000, request_timeout: Duration::from_millis(10_000) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NetworkConfig::new(2018);
        assert_eq!(config.max_items_per_response, 192);
        assert_eq!(config.downloader_parallelism, 4);
        assert_eq!(config.request_timeout, Duration::from_millis(8000));
        assert_eq!(config.max_retries, 3);
        assert!(!config.fast_sync);
        assert_eq!(config.ibft.epoch_length, 30_000);
    }

    #[test]
    fn status_from_config() {
        let config = NetworkConfig::builder(5)
            .sub_protocol(SubProtocol::Istanbul64)
            .build();
        let status = config.local_status(B256::repeat_byte(0x01), &ChainHead::default());
        assert_eq!(status.version, 64);
        assert_eq!(status.network_id, 5);
        assert_eq!(status.genesis_hash, B256::repeat_byte(0x01));
    }
}
