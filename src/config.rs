/// Centralized configuration constants for camlink

// Camera access points advertise one of these SSID prefixes
pub const CAMERA_SSID_PREFIXES: [&str; 3] = ["CGO3P", "CGOPRO", "CGOET"];

// Network priorities. Lower wins in the platform's selection.
pub const PRIORITY_PREFERRED: i32 = 1;
pub const PRIORITY_DEMOTED: i32 = 10;

// Host session
pub const WAKE_LOCK_TAG: &str = "camlink";

// Controller service
pub const SERVICE_CHANNEL_CAPACITY: usize = 64;

/// Policy knobs for the binding controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub camera_prefixes: Vec<String>,
    pub preferred_priority: i32,
    pub demoted_priority: i32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            camera_prefixes: CAMERA_SSID_PREFIXES.iter().map(|p| p.to_string()).collect(),
            preferred_priority: PRIORITY_PREFERRED,
            demoted_priority: PRIORITY_DEMOTED,
        }
    }
}

impl ControllerConfig {
    /// Whether `ssid` looks like a camera access point
    pub fn is_camera_ssid(&self, ssid: &str) -> bool {
        self.camera_prefixes
            .iter()
            .any(|prefix| ssid.starts_with(prefix.as_str()))
    }

    /// Replace the camera prefixes, keeping the priorities
    pub fn with_camera_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.camera_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }
}
