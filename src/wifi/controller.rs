//! WiFi binding controller.
//!
//! Owns the receiver mode and the cached connection values, drives the
//! platform's configuration store and turns platform broadcasts into
//! listener notifications. Platform failures never leave this type: they
//! are logged and the controller keeps its current mode.

use crate::config::ControllerConfig;
use crate::error::{WifiError, WifiResult};
use crate::wifi::event::{EventKind, PlatformEvent};
use crate::wifi::listener::WifiListener;
use crate::wifi::platform::WifiPlatform;
use crate::wifi::types::{
    ConnectionState, DetailedState, NetworkConfig, NetworkId, ReceiverMode, SupplicantError,
    WifiInfo, normalize_ssid,
};
use secrecy::SecretString;
use tracing::{debug, error, info, warn};

pub struct WifiController<P, L> {
    platform: P,
    listener: L,
    config: ControllerConfig,
    mode: ReceiverMode,
    state: ConnectionState,
}

impl<P: WifiPlatform, L: WifiListener> WifiController<P, L> {
    pub fn new(platform: P, listener: L) -> Self {
        Self::with_config(platform, listener, ControllerConfig::default())
    }

    pub fn with_config(platform: P, listener: L, config: ControllerConfig) -> Self {
        Self {
            platform,
            listener,
            config,
            mode: ReceiverMode::Disabled,
            state: ConnectionState::default(),
        }
    }

    /// Broadcast kinds the host must route to [`dispatch`](Self::dispatch)
    pub fn subscribed_events(&self) -> &'static [EventKind] {
        &EventKind::ALL
    }

    pub fn receiver_mode(&self) -> ReceiverMode {
        self.mode
    }

    pub fn current_rssi(&self) -> i32 {
        self.state.rssi
    }

    pub fn current_connection_id(&self) -> &str {
        &self.state.ssid
    }

    /// Battery fraction in [0, 1], `None` until the first reading
    pub fn current_battery_level(&self) -> Option<f32> {
        self.state.battery_level
    }

    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_parts(self) -> (P, L) {
        (self.platform, self.listener)
    }

    /// Re-rank stored networks so camera access points win, and pick up
    /// the active connection.
    pub fn refresh_known_networks(&mut self) {
        if let Err(e) = self.try_refresh_known_networks() {
            error!("refresh of known networks failed: {e}");
        }
    }

    fn try_refresh_known_networks(&mut self) -> WifiResult<()> {
        let mut current = None;
        let mut camera = String::new();

        for mut record in self.platform.configured_networks()? {
            let ssid = normalize_ssid(&record.ssid).to_string();
            if ssid.is_empty() {
                continue;
            }
            debug!(ssid = %ssid, priority = record.priority, "found config");
            if record.is_current() {
                current = Some(ssid.clone());
            }
            if self.config.is_camera_ssid(&ssid) {
                record.priority = self.config.preferred_priority;
                camera = ssid.clone();
            } else {
                record.priority = self.config.demoted_priority;
            }
            if let Err(e) = self.platform.update_network(&record) {
                warn!(ssid = %ssid, "could not re-rank network: {e}");
            }
        }

        self.state.ssid = current.unwrap_or(camera);
        info!(active = %self.state.ssid, "known networks refreshed");
        self.platform.save_configuration()
    }

    /// Drop the association and disable every stored network
    pub fn reset_all_networks(&mut self) {
        if self.is_reset() {
            debug!("networks already reset");
            return;
        }
        info!("resetting all networks");
        if let Err(e) = self.try_disable_all() {
            error!("reset of networks failed: {e}");
        }
        self.state.ssid.clear();
        self.state.rssi = 0;
        self.listener.signal_updated();
        self.listener.disconnected();
    }

    fn is_reset(&mut self) -> bool {
        if !self.state.ssid.is_empty() || self.state.rssi != 0 {
            return false;
        }
        match self.platform.configured_networks() {
            Ok(records) => records
                .iter()
                .filter(|r| !normalize_ssid(&r.ssid).is_empty())
                .all(|r| !r.is_enabled()),
            Err(_) => false,
        }
    }

    fn try_disable_all(&mut self) -> WifiResult<()> {
        let records = self.platform.configured_networks()?;
        self.platform.disconnect()?;
        for record in records
            .iter()
            .filter(|r| !normalize_ssid(&r.ssid).is_empty())
        {
            self.platform.disable_network(record.id)?;
        }
        self.platform.save_configuration()
    }

    /// Make `ssid` the only enabled network and connect to it.
    ///
    /// The outcome arrives later as a `connected` or `auth_error`
    /// notification; failures here are only logged.
    pub fn bind_to_network(&mut self, ssid: &str, passphrase: SecretString) {
        info!(ssid, "binding");
        self.mode = ReceiverMode::Binding;
        if let Err(e) = self.try_bind(ssid, passphrase) {
            error!(ssid, "bind failed: {e}");
        }
    }

    fn try_bind(&mut self, ssid: &str, passphrase: SecretString) -> WifiResult<()> {
        let records = self.platform.configured_networks()?;
        self.platform.disconnect()?;
        for mut record in records.into_iter().filter(|r| {
            let other = normalize_ssid(&r.ssid);
            !other.is_empty() && other != ssid
        }) {
            record.priority = self.config.demoted_priority;
            if let Err(e) = self.platform.update_network(&record) {
                warn!(ssid = %record.ssid, "could not demote network: {e}");
            }
            if let Err(e) = self.platform.disable_network(record.id) {
                warn!(ssid = %record.ssid, "could not disable network: {e}");
            }
        }
        self.platform.save_configuration()?;

        if let Some(existing) = self.find_network(ssid)? {
            self.platform.enable_network(existing, true)?;
            self.platform.reconnect()?;
            return self.platform.save_configuration();
        }

        self.platform.add_network(NetworkConfig {
            ssid: ssid.to_string(),
            pre_shared_key: passphrase,
            priority: self.config.preferred_priority,
        })?;
        self.platform.save_configuration()?;

        let added = self
            .find_network(ssid)?
            .ok_or_else(|| WifiError::NetworkNotFound {
                ssid: ssid.to_string(),
            })?;
        self.platform.enable_network(added, true)?;
        self.platform.reconnect()
    }

    fn find_network(&mut self, ssid: &str) -> WifiResult<Option<NetworkId>> {
        Ok(self
            .platform
            .configured_networks()?
            .into_iter()
            .find(|r| normalize_ssid(&r.ssid) == ssid)
            .map(|r| r.id))
    }

    /// Request a scan; results are reported through the listener
    pub fn start_scan(&mut self) {
        info!("starting scan");
        self.mode = ReceiverMode::Scanning;
        if let Err(e) = self.platform.start_scan() {
            error!("scan request failed: {e}");
        }
    }

    pub fn disconnect(&mut self) {
        if let Err(e) = self.platform.disconnect() {
            warn!("disconnect failed: {e}");
        }
    }

    pub fn reconnect(&mut self) {
        if let Err(e) = self.platform.reconnect() {
            warn!("reconnect failed: {e}");
        }
    }

    pub fn enable_radio(&mut self, on: bool) {
        if let Err(e) = self.platform.set_radio_enabled(on) {
            warn!(on, "radio power change failed: {e}");
        }
    }

    /// Single entry point for platform broadcasts
    pub fn dispatch(&mut self, event: PlatformEvent) {
        let kind = event.kind();
        let result = match event {
            PlatformEvent::ScanResultsAvailable => self.on_scan_results(),
            PlatformEvent::NetworkStateChanged { state, wifi_info } => {
                self.on_network_state(state, wifi_info);
                Ok(())
            }
            PlatformEvent::SupplicantStateChanged { error } => {
                self.on_supplicant_state(error);
                Ok(())
            }
            PlatformEvent::RssiChanged => self.on_rssi_changed(),
            PlatformEvent::BatteryChanged { level, scale } => {
                self.on_battery_changed(level, scale);
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(?kind, "dropped platform event: {e}");
        }
    }

    fn on_scan_results(&mut self) -> WifiResult<()> {
        if self.mode != ReceiverMode::Scanning {
            debug!(mode = ?self.mode, "ignoring scan results");
            return Ok(());
        }
        let results = self.platform.scan_results()?;
        for result in &results {
            self.listener
                .network_discovered(normalize_ssid(&result.ssid), result.level);
        }
        self.listener.scan_complete();
        self.mode = ReceiverMode::Disabled;
        Ok(())
    }

    fn on_network_state(
        &mut self,
        state: Option<DetailedState>,
        wifi_info: Option<WifiInfo>,
    ) {
        match (state, wifi_info) {
            (Some(DetailedState::Connected), Some(info)) => {
                info!(ssid = %info.ssid, rssi = info.rssi, "connected");
                self.state.ssid = normalize_ssid(&info.ssid).to_string();
                self.state.rssi = info.rssi;
                if self.mode == ReceiverMode::Binding {
                    self.mode = ReceiverMode::Disabled;
                }
                self.listener.signal_updated();
                self.listener.connected();
            }
            (Some(DetailedState::Connected), None) => {
                debug!("connected state without association info");
            }
            (Some(DetailedState::Disconnected), _) => {
                info!("disconnected");
                self.state.ssid.clear();
                self.state.rssi = 0;
                self.listener.signal_updated();
                self.listener.disconnected();
            }
            (Some(other), _) => debug!(state = ?other, "ignoring transitional state"),
            (None, _) => debug!("network state change without network info"),
        }
    }

    fn on_supplicant_state(&mut self, error: Option<SupplicantError>) {
        if self.mode != ReceiverMode::Binding {
            return;
        }
        if error == Some(SupplicantError::Authenticating) {
            error!("authentication error");
            self.mode = ReceiverMode::Disabled;
            self.state.ssid.clear();
            self.listener.auth_error();
        }
    }

    fn on_rssi_changed(&mut self) -> WifiResult<()> {
        let Some(info) = self.platform.connection_info()? else {
            debug!("rssi change without connection info");
            return Ok(());
        };
        debug!(rssi = info.rssi, "rssi");
        self.state.rssi = info.rssi;
        self.listener.signal_updated();
        Ok(())
    }

    fn on_battery_changed(&mut self, level: Option<i32>, scale: Option<i32>) {
        let (Some(level), Some(scale)) = (level, scale) else {
            debug!("battery change without level or scale");
            return;
        };
        if level < 0 || scale <= 0 {
            debug!(level, scale, "ignoring malformed battery reading");
            return;
        }
        let fraction = (level as f32 / scale as f32).min(1.0);
        debug!(fraction, "battery");
        self.state.battery_level = Some(fraction);
        self.listener.battery_updated();
    }
}
