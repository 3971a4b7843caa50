//! In-memory WiFi platform.
//!
//! Models the configuration store, the access points in range and the
//! broadcasts a real platform would raise, so the controller can be driven
//! end to end without hardware.

use crate::error::{WifiError, WifiResult};
use crate::wifi::event::PlatformEvent;
use crate::wifi::platform::WifiPlatform;
use crate::wifi::types::{
    NetworkConfig, NetworkId, NetworkRecord, NetworkStatus, ScanResult, WifiInfo,
};
use secrecy::{ExposeSecret, SecretString};
use std::cmp::Reverse;
use std::collections::{HashSet, VecDeque};

/// An access point within radio range
#[derive(Debug, Clone)]
pub struct AccessPoint {
    pub ssid: String,
    pub level: i32,
    pub passphrase: Option<SecretString>,
}

/// Platform calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ConfiguredNetworks,
    Update,
    Add,
    Enable,
    Disable,
    Save,
    StartScan,
    ScanResults,
    Disconnect,
    Reconnect,
    Radio,
    ConnectionInfo,
}

#[derive(Debug)]
struct Association {
    id: NetworkId,
    info: WifiInfo,
}

#[derive(Debug)]
pub struct SimulatedPlatform {
    records: Vec<NetworkRecord>,
    next_id: i32,
    access_points: Vec<AccessPoint>,
    radio_enabled: bool,
    association: Option<Association>,
    pending: VecDeque<PlatformEvent>,
    failures: HashSet<FailPoint>,
    saves: usize,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
            access_points: Vec::new(),
            radio_enabled: true,
            association: None,
            pending: VecDeque::new(),
            failures: HashSet::new(),
            saves: 0,
        }
    }

    /// Add a stored configuration without credentials
    pub fn with_network(mut self, ssid: &str, priority: i32, status: NetworkStatus) -> Self {
        let id = self.allocate_id();
        self.records.push(NetworkRecord {
            id,
            ssid: ssid.to_string(),
            priority,
            status,
            pre_shared_key: None,
        });
        if status == NetworkStatus::Current {
            let level = self.level_of(ssid).unwrap_or(0);
            self.association = Some(Association {
                id,
                info: WifiInfo {
                    ssid: quoted(ssid),
                    rssi: level,
                },
            });
        }
        self
    }

    /// Put an access point in range
    pub fn with_access_point(mut self, ssid: &str, level: i32, passphrase: Option<&str>) -> Self {
        self.access_points.push(AccessPoint {
            ssid: ssid.to_string(),
            level,
            passphrase: passphrase.map(|p| SecretString::from(p.to_string())),
        });
        self
    }

    pub fn with_radio(mut self, enabled: bool) -> Self {
        self.radio_enabled = enabled;
        self
    }

    pub fn fail(&mut self, point: FailPoint) {
        self.failures.insert(point);
    }

    pub fn heal(&mut self, point: FailPoint) {
        self.failures.remove(&point);
    }

    pub fn records(&self) -> &[NetworkRecord] {
        &self.records
    }

    pub fn record(&self, ssid: &str) -> Option<&NetworkRecord> {
        self.records.iter().find(|r| r.ssid == ssid)
    }

    pub fn radio_enabled(&self) -> bool {
        self.radio_enabled
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// SSID of the current association, unquoted
    pub fn associated_ssid(&self) -> Option<&str> {
        self.association
            .as_ref()
            .and_then(|a| self.records.iter().find(|r| r.id == a.id))
            .map(|r| r.ssid.as_str())
    }

    /// Change the signal of the access point we are associated with
    pub fn move_signal(&mut self, level: i32) {
        if let Some(association) = self.association.as_mut() {
            association.info.rssi = level;
            self.pending.push_back(PlatformEvent::RssiChanged);
        }
    }

    /// Queue a broadcast the platform would raise on its own
    pub fn push_event(&mut self, event: PlatformEvent) {
        self.pending.push_back(event);
    }

    /// Take every broadcast raised since the last drain
    pub fn drain_events(&mut self) -> Vec<PlatformEvent> {
        self.pending.drain(..).collect()
    }

    fn check(&self, point: FailPoint, error: impl FnOnce(String) -> WifiError) -> WifiResult<()> {
        if self.failures.contains(&point) {
            return Err(error(format!("injected {point:?} failure")));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> NetworkId {
        let id = NetworkId(self.next_id);
        self.next_id += 1;
        id
    }

    fn level_of(&self, ssid: &str) -> Option<i32> {
        self.access_points
            .iter()
            .find(|ap| ap.ssid == ssid)
            .map(|ap| ap.level)
    }

    fn record_mut(&mut self, id: NetworkId) -> Option<&mut NetworkRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    fn drop_association(&mut self) {
        if let Some(association) = self.association.take() {
            if let Some(record) = self.record_mut(association.id)
                && record.status == NetworkStatus::Current
            {
                record.status = NetworkStatus::Enabled;
            }
            self.pending.push_back(PlatformEvent::disconnected());
        }
    }

    fn associated_with(&self, id: NetworkId) -> bool {
        self.association.as_ref().is_some_and(|a| a.id == id)
    }

    fn set_disabled(&mut self, id: NetworkId) {
        if self.associated_with(id) {
            self.drop_association();
        }
        if let Some(record) = self.record_mut(id) {
            record.status = NetworkStatus::Disabled;
        }
    }
}

fn quoted(ssid: &str) -> String {
    format!("\"{ssid}\"")
}

fn credentials_match(ap: &AccessPoint, record: &NetworkRecord) -> bool {
    match (&ap.passphrase, &record.pre_shared_key) {
        (None, _) => true,
        (Some(expected), Some(given)) => expected.expose_secret() == given.expose_secret(),
        (Some(_), None) => false,
    }
}

impl WifiPlatform for SimulatedPlatform {
    fn configured_networks(&mut self) -> WifiResult<Vec<NetworkRecord>> {
        self.check(FailPoint::ConfiguredNetworks, |reason| {
            WifiError::ConfigListFailed { reason }
        })?;
        Ok(self.records.clone())
    }

    fn update_network(&mut self, record: &NetworkRecord) -> WifiResult<()> {
        let id = record.id;
        self.check(FailPoint::Update, |reason| WifiError::UpdateFailed {
            id: id.0,
            reason,
        })?;
        if !record.is_enabled() {
            self.set_disabled(id);
        }
        let stored = self.record_mut(id).ok_or_else(|| WifiError::UpdateFailed {
            id: id.0,
            reason: "unknown network".to_string(),
        })?;
        stored.priority = record.priority;
        if record.is_enabled() && stored.status == NetworkStatus::Disabled {
            stored.status = NetworkStatus::Enabled;
        }
        Ok(())
    }

    fn add_network(&mut self, config: NetworkConfig) -> WifiResult<NetworkId> {
        let ssid = config.ssid.clone();
        self.check(FailPoint::Add, |reason| WifiError::AddFailed { ssid, reason })?;
        let id = self.allocate_id();
        self.records.push(NetworkRecord {
            id,
            ssid: config.ssid,
            priority: config.priority,
            status: NetworkStatus::Disabled,
            pre_shared_key: Some(config.pre_shared_key),
        });
        Ok(id)
    }

    fn enable_network(&mut self, id: NetworkId, disable_others: bool) -> WifiResult<()> {
        self.check(FailPoint::Enable, |reason| WifiError::EnableFailed {
            id: id.0,
            reason,
        })?;
        if self.record_mut(id).is_none() {
            return Err(WifiError::EnableFailed {
                id: id.0,
                reason: "unknown network".to_string(),
            });
        }
        if disable_others {
            let others: Vec<NetworkId> = self
                .records
                .iter()
                .filter(|r| r.id != id)
                .map(|r| r.id)
                .collect();
            for other in others {
                self.set_disabled(other);
            }
        }
        if let Some(record) = self.record_mut(id)
            && record.status == NetworkStatus::Disabled
        {
            record.status = NetworkStatus::Enabled;
        }
        Ok(())
    }

    fn disable_network(&mut self, id: NetworkId) -> WifiResult<()> {
        self.check(FailPoint::Disable, |reason| WifiError::DisableFailed {
            id: id.0,
            reason,
        })?;
        if self.record_mut(id).is_none() {
            return Err(WifiError::DisableFailed {
                id: id.0,
                reason: "unknown network".to_string(),
            });
        }
        self.set_disabled(id);
        Ok(())
    }

    fn save_configuration(&mut self) -> WifiResult<()> {
        self.check(FailPoint::Save, |reason| WifiError::SaveFailed { reason })?;
        self.saves += 1;
        Ok(())
    }

    fn start_scan(&mut self) -> WifiResult<()> {
        self.check(FailPoint::StartScan, |reason| WifiError::ScanFailed {
            reason,
        })?;
        if !self.radio_enabled {
            return Err(WifiError::ScanFailed {
                reason: "radio is off".to_string(),
            });
        }
        self.pending.push_back(PlatformEvent::ScanResultsAvailable);
        Ok(())
    }

    fn scan_results(&mut self) -> WifiResult<Vec<ScanResult>> {
        self.check(FailPoint::ScanResults, |reason| {
            WifiError::ScanResultsFailed { reason }
        })?;
        Ok(self
            .access_points
            .iter()
            .map(|ap| ScanResult {
                ssid: ap.ssid.clone(),
                level: ap.level,
            })
            .collect())
    }

    fn disconnect(&mut self) -> WifiResult<()> {
        self.check(FailPoint::Disconnect, |reason| {
            WifiError::DisconnectFailed { reason }
        })?;
        self.drop_association();
        Ok(())
    }

    fn reconnect(&mut self) -> WifiResult<()> {
        self.check(FailPoint::Reconnect, |reason| {
            WifiError::ReconnectFailed { reason }
        })?;
        if !self.radio_enabled {
            return Err(WifiError::ReconnectFailed {
                reason: "radio is off".to_string(),
            });
        }
        if self.association.is_some() {
            return Ok(());
        }

        // Lowest priority value first, then the strongest signal
        let candidate = self
            .records
            .iter()
            .filter(|r| r.is_enabled())
            .filter_map(|r| {
                self.access_points
                    .iter()
                    .find(|ap| ap.ssid == r.ssid)
                    .map(|ap| (r, ap))
            })
            .min_by_key(|(r, ap)| (r.priority, Reverse(ap.level)));

        let Some((record, ap)) = candidate else {
            return Ok(());
        };

        if !credentials_match(ap, record) {
            self.pending.push_back(PlatformEvent::auth_error());
            return Ok(());
        }

        let id = record.id;
        let info = WifiInfo {
            ssid: quoted(&record.ssid),
            rssi: ap.level,
        };
        if let Some(record) = self.record_mut(id) {
            record.status = NetworkStatus::Current;
        }
        self.pending
            .push_back(PlatformEvent::connected(info.ssid.clone(), info.rssi));
        self.association = Some(Association { id, info });
        Ok(())
    }

    fn is_radio_enabled(&mut self) -> WifiResult<bool> {
        self.check(FailPoint::Radio, |reason| WifiError::RadioFailed { reason })?;
        Ok(self.radio_enabled)
    }

    fn set_radio_enabled(&mut self, enabled: bool) -> WifiResult<()> {
        self.check(FailPoint::Radio, |reason| WifiError::RadioFailed { reason })?;
        if !enabled {
            self.drop_association();
        }
        self.radio_enabled = enabled;
        Ok(())
    }

    fn connection_info(&mut self) -> WifiResult<Option<WifiInfo>> {
        self.check(FailPoint::ConnectionInfo, |reason| {
            WifiError::ConnectionInfoFailed { reason }
        })?;
        Ok(self.association.as_ref().map(|a| a.info.clone()))
    }
}
