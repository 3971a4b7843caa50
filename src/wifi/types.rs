use secrecy::SecretString;
use std::fmt;

/// Opaque platform handle for a stored network configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub i32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a stored configuration as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkStatus {
    /// The configuration the radio is associated with right now
    Current,
    #[default]
    Enabled,
    Disabled,
}

/// A network configuration held by the platform store
#[derive(Debug, Clone)]
pub struct NetworkRecord {
    pub id: NetworkId,
    pub ssid: String,
    pub priority: i32,
    pub status: NetworkStatus,
    pub pre_shared_key: Option<SecretString>,
}

impl NetworkRecord {
    pub fn is_enabled(&self) -> bool {
        self.status != NetworkStatus::Disabled
    }

    pub fn is_current(&self) -> bool {
        self.status == NetworkStatus::Current
    }
}

/// Credentials for a configuration the controller asks the platform to add
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub ssid: String,
    pub pre_shared_key: SecretString,
    pub priority: i32,
}

/// Receiver mode of the binding controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverMode {
    #[default]
    Disabled,
    Scanning,
    Binding,
}

/// Last-observed connection values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionState {
    pub ssid: String,
    pub rssi: i32,
    pub battery_level: Option<f32>,
}

/// One access point from a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub ssid: String,
    pub level: i32,
}

/// Association info for the current connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiInfo {
    pub ssid: String,
    pub rssi: i32,
}

/// Detailed connection state reported with network state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailedState {
    Idle,
    Scanning,
    Connecting,
    Authenticating,
    ObtainingIpAddr,
    Connected,
    Suspended,
    Disconnecting,
    Disconnected,
    Failed,
    Blocked,
}

/// Error reported by the supplicant alongside a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplicantError {
    Authenticating,
    Other(i32),
}

/// Strip one surrounding pair of double quotes from a platform SSID
pub fn normalize_ssid(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_platform_quotes() {
        assert_eq!(normalize_ssid("\"CamAP\""), "CamAP");
        assert_eq!(normalize_ssid("CamAP"), "CamAP");
        assert_eq!(normalize_ssid("\"half"), "\"half");
        assert_eq!(normalize_ssid("\"\""), "");
    }

    #[test]
    fn disabled_records_are_not_enabled() {
        let record = NetworkRecord {
            id: NetworkId(3),
            ssid: "HomeNet".to_string(),
            priority: 10,
            status: NetworkStatus::Disabled,
            pre_shared_key: None,
        };
        assert!(!record.is_enabled());
        assert!(!record.is_current());
    }
}
