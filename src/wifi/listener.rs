use tokio::sync::mpsc::UnboundedSender;

/// Outward notifications raised by the binding controller
pub trait WifiListener: Send + 'static {
    fn network_discovered(&mut self, ssid: &str, level: i32);
    fn scan_complete(&mut self);
    fn auth_error(&mut self);
    fn connected(&mut self);
    fn disconnected(&mut self);
    /// The cached signal strength changed; re-read it from the controller
    fn signal_updated(&mut self);
    /// The cached battery level changed; re-read it from the controller
    fn battery_updated(&mut self);
}

/// Listener notifications as values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    NetworkDiscovered { ssid: String, level: i32 },
    ScanComplete,
    AuthError,
    Connected,
    Disconnected,
    SignalUpdated,
    BatteryUpdated,
}

/// Listener that forwards every notification over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: UnboundedSender<ControllerEvent>,
}

impl ChannelListener {
    pub fn new(sender: UnboundedSender<ControllerEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: ControllerEvent) {
        // Receiver gone means nobody is listening anymore
        let _ = self.sender.send(event);
    }
}

impl WifiListener for ChannelListener {
    fn network_discovered(&mut self, ssid: &str, level: i32) {
        self.send(ControllerEvent::NetworkDiscovered {
            ssid: ssid.to_string(),
            level,
        });
    }

    fn scan_complete(&mut self) {
        self.send(ControllerEvent::ScanComplete);
    }

    fn auth_error(&mut self) {
        self.send(ControllerEvent::AuthError);
    }

    fn connected(&mut self) {
        self.send(ControllerEvent::Connected);
    }

    fn disconnected(&mut self) {
        self.send(ControllerEvent::Disconnected);
    }

    fn signal_updated(&mut self) {
        self.send(ControllerEvent::SignalUpdated);
    }

    fn battery_updated(&mut self) {
        self.send(ControllerEvent::BatteryUpdated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn forwards_notifications_in_order() {
        let (tx, mut rx) = unbounded_channel();
        let mut listener = ChannelListener::new(tx);

        listener.network_discovered("CGO3P_1", -40);
        listener.scan_complete();

        assert_eq!(
            rx.try_recv().ok(),
            Some(ControllerEvent::NetworkDiscovered {
                ssid: "CGO3P_1".to_string(),
                level: -40
            })
        );
        assert_eq!(rx.try_recv().ok(), Some(ControllerEvent::ScanComplete));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut listener = ChannelListener::new(tx);
        listener.connected();
    }
}
