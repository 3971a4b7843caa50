use crate::wifi::types::{DetailedState, SupplicantError, WifiInfo};

/// Kinds of platform broadcasts the controller subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ScanResultsAvailable,
    NetworkStateChanged,
    SupplicantStateChanged,
    RssiChanged,
    BatteryChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::BatteryChanged,
        EventKind::ScanResultsAvailable,
        EventKind::NetworkStateChanged,
        EventKind::SupplicantStateChanged,
        EventKind::RssiChanged,
    ];
}

/// A platform broadcast delivered to the controller's dispatch entry point.
///
/// Optional payload fields mirror what the platform may omit; a missing
/// field makes the event malformed and it is dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    ScanResultsAvailable,
    NetworkStateChanged {
        state: Option<DetailedState>,
        wifi_info: Option<WifiInfo>,
    },
    SupplicantStateChanged {
        error: Option<SupplicantError>,
    },
    RssiChanged,
    BatteryChanged {
        level: Option<i32>,
        scale: Option<i32>,
    },
}

impl PlatformEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlatformEvent::ScanResultsAvailable => EventKind::ScanResultsAvailable,
            PlatformEvent::NetworkStateChanged { .. } => EventKind::NetworkStateChanged,
            PlatformEvent::SupplicantStateChanged { .. } => EventKind::SupplicantStateChanged,
            PlatformEvent::RssiChanged => EventKind::RssiChanged,
            PlatformEvent::BatteryChanged { .. } => EventKind::BatteryChanged,
        }
    }

    pub fn connected(ssid: impl Into<String>, rssi: i32) -> Self {
        PlatformEvent::NetworkStateChanged {
            state: Some(DetailedState::Connected),
            wifi_info: Some(WifiInfo {
                ssid: ssid.into(),
                rssi,
            }),
        }
    }

    pub fn disconnected() -> Self {
        PlatformEvent::NetworkStateChanged {
            state: Some(DetailedState::Disconnected),
            wifi_info: None,
        }
    }

    pub fn auth_error() -> Self {
        PlatformEvent::SupplicantStateChanged {
            error: Some(SupplicantError::Authenticating),
        }
    }

    pub fn battery(level: i32, scale: i32) -> Self {
        PlatformEvent::BatteryChanged {
            level: Some(level),
            scale: Some(scale),
        }
    }
}
