use crate::error::WifiResult;
use crate::wifi::types::{NetworkConfig, NetworkId, NetworkRecord, ScanResult, WifiInfo};

/// The platform's WiFi service: configuration store, radio and association.
///
/// Every call may fail; the controller never lets those failures escape.
pub trait WifiPlatform: Send + 'static {
    /// All stored network configurations
    fn configured_networks(&mut self) -> WifiResult<Vec<NetworkRecord>>;

    /// Write back priority and enabled state of an existing record
    fn update_network(&mut self, record: &NetworkRecord) -> WifiResult<()>;

    /// Store a new configuration, returning its handle
    fn add_network(&mut self, config: NetworkConfig) -> WifiResult<NetworkId>;

    /// Enable a configuration, optionally disabling every other one
    fn enable_network(&mut self, id: NetworkId, disable_others: bool) -> WifiResult<()>;

    fn disable_network(&mut self, id: NetworkId) -> WifiResult<()>;

    /// Persist the configuration store
    fn save_configuration(&mut self) -> WifiResult<()>;

    /// Request an asynchronous scan; results arrive as a broadcast
    fn start_scan(&mut self) -> WifiResult<()>;

    fn scan_results(&mut self) -> WifiResult<Vec<ScanResult>>;

    fn disconnect(&mut self) -> WifiResult<()>;

    fn reconnect(&mut self) -> WifiResult<()>;

    fn is_radio_enabled(&mut self) -> WifiResult<bool>;

    fn set_radio_enabled(&mut self, enabled: bool) -> WifiResult<()>;

    /// Association info for the current connection, if any
    fn connection_info(&mut self) -> WifiResult<Option<WifiInfo>>;
}
