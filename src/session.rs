//! Host application lifecycle around the binding controller.
//!
//! A [`Session`] is built when the host starts: it keeps the device awake,
//! powers the radio on and ranks the stored networks. Dropping it releases
//! the host resources again.

use crate::config::{ControllerConfig, WAKE_LOCK_TAG};
use crate::error::{WifiError, WifiResult};
use crate::wifi::{WifiController, WifiListener, WifiPlatform};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Power, display and speech services of the host
pub trait HostServices {
    fn acquire_wake_lock(&mut self, tag: &str) -> WifiResult<()>;
    fn release_wake_lock(&mut self) -> WifiResult<()>;
    fn keep_screen_on(&mut self, on: bool);
    fn set_fullscreen(&mut self, on: bool);
    fn speak(&mut self, message: &str) -> WifiResult<()>;
}

/// Host resources held for the lifetime of a session; released on drop
pub struct HostLease<H: HostServices> {
    host: H,
    wake_lock_held: bool,
}

impl<H: HostServices> HostLease<H> {
    fn acquire(mut host: H) -> Self {
        let wake_lock_held = match host.acquire_wake_lock(WAKE_LOCK_TAG) {
            Ok(()) => {
                info!("wake lock acquired");
                true
            }
            Err(e) => {
                warn!("wake lock not acquired: {e}");
                false
            }
        };
        host.keep_screen_on(true);
        host.set_fullscreen(true);
        Self {
            host,
            wake_lock_held,
        }
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock_held
    }

    /// Speak a message through the host's speech engine
    pub fn say(&mut self, message: &str) {
        info!(message, "say");
        if let Err(e) = self.host.speak(message) {
            warn!("speech failed: {e}");
        }
    }
}

impl<H: HostServices> Drop for HostLease<H> {
    fn drop(&mut self) {
        if self.wake_lock_held {
            match self.host.release_wake_lock() {
                Ok(()) => info!("wake lock released"),
                Err(e) => error!("wake lock release failed: {e}"),
            }
        }
        self.host.keep_screen_on(false);
        self.host.set_fullscreen(false);
    }
}

pub struct Session<P, L, H: HostServices> {
    controller: WifiController<P, L>,
    lease: HostLease<H>,
}

impl<P, L, H> Session<P, L, H>
where
    P: WifiPlatform,
    L: WifiListener,
    H: HostServices,
{
    /// Bring up host services and the controller
    pub fn start(mut platform: P, listener: L, host: H, config: ControllerConfig) -> Self {
        info!("starting session");
        let lease = HostLease::acquire(host);

        match platform.is_radio_enabled() {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = platform.set_radio_enabled(true) {
                    error!("could not power the radio on: {e}");
                }
            }
            Err(e) => warn!("radio state unknown: {e}"),
        }

        let mut controller = WifiController::with_config(platform, listener, config);
        controller.refresh_known_networks();
        Self { controller, lease }
    }

    pub fn controller(&self) -> &WifiController<P, L> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WifiController<P, L> {
        &mut self.controller
    }

    pub fn wake_lock_held(&self) -> bool {
        self.lease.wake_lock_held()
    }

    pub fn say(&mut self, message: &str) {
        self.lease.say(message);
    }

    /// Split off the controller, e.g. to move it into its own task, while
    /// the lease keeps the host resources
    pub fn into_parts(self) -> (WifiController<P, L>, HostLease<H>) {
        let Session { controller, lease } = self;
        (controller, lease)
    }

    /// Tear down host services and hand back the controller
    pub fn into_controller(self) -> WifiController<P, L> {
        let (controller, lease) = self.into_parts();
        drop(lease);
        controller
    }
}

/// Host state recorded by [`SimulatedHost`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostState {
    pub wake_lock: Option<String>,
    pub screen_on: bool,
    pub fullscreen: bool,
    pub spoken: Vec<String>,
}

/// In-memory host whose state can be inspected through any clone
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    state: Arc<Mutex<HostState>>,
    refuse_wake_lock: bool,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that never grants the wake lock
    pub fn refusing_wake_lock() -> Self {
        Self {
            refuse_wake_lock: true,
            ..Self::default()
        }
    }

    pub fn state(&self) -> HostState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HostServices for SimulatedHost {
    fn acquire_wake_lock(&mut self, tag: &str) -> WifiResult<()> {
        if self.refuse_wake_lock {
            return Err(WifiError::WakeLockFailed {
                tag: tag.to_string(),
                reason: "refused by host".to_string(),
            });
        }
        self.lock().wake_lock = Some(tag.to_string());
        Ok(())
    }

    fn release_wake_lock(&mut self) -> WifiResult<()> {
        self.lock().wake_lock = None;
        Ok(())
    }

    fn keep_screen_on(&mut self, on: bool) {
        self.lock().screen_on = on;
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.lock().fullscreen = on;
    }

    fn speak(&mut self, message: &str) -> WifiResult<()> {
        self.lock().spoken.push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::{ChannelListener, NetworkStatus, SimulatedPlatform};
    use tokio::sync::mpsc::unbounded_channel;

    fn listener() -> ChannelListener {
        let (tx, _rx) = unbounded_channel();
        ChannelListener::new(tx)
    }

    #[test]
    fn start_acquires_host_resources_and_ranks_networks() {
        let host = SimulatedHost::new();
        let platform = SimulatedPlatform::new()
            .with_radio(false)
            .with_network("CGO3P_1", 7, NetworkStatus::Enabled)
            .with_network("HomeNet", 7, NetworkStatus::Enabled);

        let session = Session::start(platform, listener(), host.clone(), ControllerConfig::default());

        let state = host.state();
        assert_eq!(state.wake_lock.as_deref(), Some(WAKE_LOCK_TAG));
        assert!(state.screen_on);
        assert!(state.fullscreen);
        assert!(session.wake_lock_held());

        let controller = session.controller();
        assert!(controller.platform().radio_enabled());
        assert_eq!(controller.platform().record("CGO3P_1").unwrap().priority, 1);
        assert_eq!(controller.current_connection_id(), "CGO3P_1");
    }

    #[test]
    fn drop_releases_host_resources() {
        let host = SimulatedHost::new();
        let session = Session::start(
            SimulatedPlatform::new(),
            listener(),
            host.clone(),
            ControllerConfig::default(),
        );
        drop(session);

        let state = host.state();
        assert_eq!(state.wake_lock, None);
        assert!(!state.screen_on);
        assert!(!state.fullscreen);
    }

    #[test]
    fn refused_wake_lock_does_not_stop_startup() {
        let host = SimulatedHost::refusing_wake_lock();
        let mut session = Session::start(
            SimulatedPlatform::new(),
            listener(),
            host.clone(),
            ControllerConfig::default(),
        );
        assert!(!session.wake_lock_held());

        session.say("Camera connected");
        assert_eq!(host.state().spoken, vec!["Camera connected".to_string()]);
    }

    #[test]
    fn into_controller_tears_down_host() {
        let host = SimulatedHost::new();
        let session = Session::start(
            SimulatedPlatform::new(),
            listener(),
            host.clone(),
            ControllerConfig::default(),
        );
        let controller = session.into_controller();

        assert_eq!(host.state().wake_lock, None);
        assert_eq!(controller.current_connection_id(), "");
    }

    #[test]
    fn lease_outlives_split_controller() {
        let host = SimulatedHost::new();
        let session = Session::start(
            SimulatedPlatform::new(),
            listener(),
            host.clone(),
            ControllerConfig::default(),
        );
        let (controller, mut lease) = session.into_parts();
        drop(controller);

        assert_eq!(host.state().wake_lock.as_deref(), Some(WAKE_LOCK_TAG));
        lease.say("Bound");
        drop(lease);

        let state = host.state();
        assert_eq!(state.wake_lock, None);
        assert_eq!(state.spoken, vec!["Bound".to_string()]);
    }
}
