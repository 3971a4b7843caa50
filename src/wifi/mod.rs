//! WiFi binding for camlink
//!
//! This module provides the binding controller that pairs the host with a
//! camera's access point, the platform and listener seams it talks through,
//! and a simulated platform for running it without hardware.

mod controller;
mod event;
mod listener;
mod platform;
pub mod service;
pub mod simulated;
mod types;

// Re-export public API
pub use controller::WifiController;
pub use event::{EventKind, PlatformEvent};
pub use listener::{ChannelListener, ControllerEvent, WifiListener};
pub use platform::WifiPlatform;
pub use service::{ControllerHandle, Snapshot};
pub use simulated::{AccessPoint, FailPoint, SimulatedPlatform};
pub use types::{
    ConnectionState, DetailedState, NetworkConfig, NetworkId, NetworkRecord, NetworkStatus,
    ReceiverMode, ScanResult, SupplicantError, WifiInfo, normalize_ssid,
};
