/// Typed errors for camlink platform operations
use thiserror::Error;

/// Result type alias for WiFi operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Errors that can occur while talking to the platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WifiError {
    #[error("Failed to list configured networks: {reason}")]
    ConfigListFailed { reason: String },

    #[error("Failed to update network {id}: {reason}")]
    UpdateFailed { id: i32, reason: String },

    #[error("Failed to add network '{ssid}': {reason}")]
    AddFailed { ssid: String, reason: String },

    #[error("Failed to enable network {id}: {reason}")]
    EnableFailed { id: i32, reason: String },

    #[error("Failed to disable network {id}: {reason}")]
    DisableFailed { id: i32, reason: String },

    #[error("Failed to save configuration: {reason}")]
    SaveFailed { reason: String },

    #[error("Failed to start scan: {reason}")]
    ScanFailed { reason: String },

    #[error("Failed to read scan results: {reason}")]
    ScanResultsFailed { reason: String },

    #[error("Failed to disconnect: {reason}")]
    DisconnectFailed { reason: String },

    #[error("Failed to reconnect: {reason}")]
    ReconnectFailed { reason: String },

    #[error("Failed to set radio power: {reason}")]
    RadioFailed { reason: String },

    #[error("Failed to read connection info: {reason}")]
    ConnectionInfoFailed { reason: String },

    #[error("Network '{ssid}' not found after adding it")]
    NetworkNotFound { ssid: String },

    #[error("Failed to acquire wake lock '{tag}': {reason}")]
    WakeLockFailed { tag: String, reason: String },

    #[error("Speech failed: {reason}")]
    SpeechFailed { reason: String },

    #[error("Controller service is no longer running")]
    ServiceClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}
