pub mod config;
pub mod error;
pub mod session;
pub mod wifi;

pub use config::ControllerConfig;
pub use error::{WifiError, WifiResult};
pub use session::{HostLease, HostServices, Session, SimulatedHost};
pub use wifi::{
    ChannelListener, ControllerEvent, PlatformEvent, ReceiverMode, WifiController, WifiListener,
    WifiPlatform,
};
