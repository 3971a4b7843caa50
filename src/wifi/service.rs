//! Single-owner task around a [`WifiController`].
//!
//! Hosts that call operations and deliver platform broadcasts from
//! different tasks go through a [`ControllerHandle`]; every request is
//! queued to the task that owns the controller, so mode and cached values
//! are only ever touched from one place.

use crate::config::SERVICE_CHANNEL_CAPACITY;
use crate::error::{WifiError, WifiResult};
use crate::wifi::controller::WifiController;
use crate::wifi::event::PlatformEvent;
use crate::wifi::listener::WifiListener;
use crate::wifi::platform::WifiPlatform;
use crate::wifi::types::{ConnectionState, ReceiverMode};
use secrecy::SecretString;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

type Job<P, L> = Box<dyn FnOnce(&mut WifiController<P, L>) + Send>;

enum Command<P, L> {
    RefreshKnownNetworks,
    ResetAllNetworks,
    Bind { ssid: String, passphrase: SecretString },
    StartScan,
    Disconnect,
    Reconnect,
    EnableRadio(bool),
    Dispatch(PlatformEvent),
    Snapshot(oneshot::Sender<Snapshot>),
    Exec(Job<P, L>),
}

/// Cached controller values at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: ReceiverMode,
    pub state: ConnectionState,
}

/// Cloneable handle to a controller running in its own task
pub struct ControllerHandle<P, L> {
    sender: mpsc::Sender<Command<P, L>>,
}

impl<P, L> Clone for ControllerHandle<P, L> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Move `controller` into a task.
///
/// The task ends once every handle is dropped and gives the controller
/// back through the returned `JoinHandle`.
pub fn spawn<P, L>(
    mut controller: WifiController<P, L>,
) -> (ControllerHandle<P, L>, JoinHandle<WifiController<P, L>>)
where
    P: WifiPlatform,
    L: WifiListener,
{
    let (sender, mut receiver) = mpsc::channel::<Command<P, L>>(SERVICE_CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        while let Some(command) = receiver.recv().await {
            run_command(&mut controller, command);
        }
        debug!("controller service stopped");
        controller
    });
    (ControllerHandle { sender }, task)
}

fn run_command<P, L>(controller: &mut WifiController<P, L>, command: Command<P, L>)
where
    P: WifiPlatform,
    L: WifiListener,
{
    match command {
        Command::RefreshKnownNetworks => controller.refresh_known_networks(),
        Command::ResetAllNetworks => controller.reset_all_networks(),
        Command::Bind { ssid, passphrase } => controller.bind_to_network(&ssid, passphrase),
        Command::StartScan => controller.start_scan(),
        Command::Disconnect => controller.disconnect(),
        Command::Reconnect => controller.reconnect(),
        Command::EnableRadio(on) => controller.enable_radio(on),
        Command::Dispatch(event) => controller.dispatch(event),
        Command::Snapshot(reply) => {
            let _ = reply.send(Snapshot {
                mode: controller.receiver_mode(),
                state: controller.connection_state().clone(),
            });
        }
        Command::Exec(job) => job(controller),
    }
}

impl<P, L> ControllerHandle<P, L>
where
    P: WifiPlatform,
    L: WifiListener,
{
    async fn send(&self, command: Command<P, L>) -> WifiResult<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| WifiError::ServiceClosed)
    }

    pub async fn refresh_known_networks(&self) -> WifiResult<()> {
        self.send(Command::RefreshKnownNetworks).await
    }

    pub async fn reset_all_networks(&self) -> WifiResult<()> {
        self.send(Command::ResetAllNetworks).await
    }

    pub async fn bind_to_network(&self, ssid: &str, passphrase: SecretString) -> WifiResult<()> {
        self.send(Command::Bind {
            ssid: ssid.to_string(),
            passphrase,
        })
        .await
    }

    pub async fn start_scan(&self) -> WifiResult<()> {
        self.send(Command::StartScan).await
    }

    pub async fn disconnect(&self) -> WifiResult<()> {
        self.send(Command::Disconnect).await
    }

    pub async fn reconnect(&self) -> WifiResult<()> {
        self.send(Command::Reconnect).await
    }

    pub async fn enable_radio(&self, on: bool) -> WifiResult<()> {
        self.send(Command::EnableRadio(on)).await
    }

    /// Deliver one platform broadcast
    pub async fn dispatch(&self, event: PlatformEvent) -> WifiResult<()> {
        self.send(Command::Dispatch(event)).await
    }

    pub async fn snapshot(&self) -> WifiResult<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        response.await.map_err(|_| WifiError::ServiceClosed)
    }

    /// Run `f` on the controller inside its task and return its result
    pub async fn with_controller<T, F>(&self, f: F) -> WifiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut WifiController<P, L>) -> T + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.send(Command::Exec(Box::new(move |controller: &mut WifiController<P, L>| {
            let _ = reply.send(f(controller));
        })))
        .await?;
        response.await.map_err(|_| WifiError::ServiceClosed)
    }
}
