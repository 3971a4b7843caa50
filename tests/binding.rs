use camlink::wifi::{NetworkStatus, SimulatedPlatform, service};
use camlink::{
    ChannelListener, ControllerConfig, ControllerEvent, PlatformEvent, ReceiverMode, Session,
    SimulatedHost,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

fn drain(rx: &mut UnboundedReceiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn scan_then_bind_to_camera() {
    let platform = SimulatedPlatform::new()
        .with_network("HomeNet", 5, NetworkStatus::Current)
        .with_network("CGO3P_old", 5, NetworkStatus::Enabled)
        .with_access_point("HomeNet", -35, None)
        .with_access_point("CGO3P_9F21", -48, Some("1234567890"));
    let host = SimulatedHost::new();
    let (tx, mut rx) = unbounded_channel();

    let session = Session::start(
        platform,
        ChannelListener::new(tx),
        host.clone(),
        ControllerConfig::default(),
    );
    assert_eq!(session.controller().current_connection_id(), "HomeNet");
    let (controller, mut lease) = session.into_parts();
    let (handle, task) = service::spawn(controller);

    let relay = |handle: camlink::wifi::ControllerHandle<SimulatedPlatform, ChannelListener>| async move {
        let events = handle
            .with_controller(|c| c.platform_mut().drain_events())
            .await
            .unwrap();
        for event in events {
            handle.dispatch(event).await.unwrap();
        }
        // Round-trip so every dispatched event has been handled
        handle.snapshot().await.unwrap();
    };

    handle.start_scan().await.unwrap();
    relay(handle.clone()).await;
    assert_eq!(
        drain(&mut rx),
        vec![
            ControllerEvent::NetworkDiscovered {
                ssid: "HomeNet".to_string(),
                level: -35
            },
            ControllerEvent::NetworkDiscovered {
                ssid: "CGO3P_9F21".to_string(),
                level: -48
            },
            ControllerEvent::ScanComplete,
        ]
    );

    handle
        .bind_to_network("CGO3P_9F21", SecretString::from("1234567890".to_string()))
        .await
        .unwrap();
    relay(handle.clone()).await;

    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&ControllerEvent::Connected));
    assert!(events.contains(&ControllerEvent::Disconnected));

    handle.dispatch(PlatformEvent::battery(81, 100)).await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.mode, ReceiverMode::Disabled);
    assert_eq!(snapshot.state.ssid, "CGO3P_9F21");
    assert_eq!(snapshot.state.rssi, -48);
    assert_eq!(snapshot.state.battery_level, Some(0.81));

    lease.say("Camera bound");
    drop(handle);
    let controller = task.await.unwrap();
    let platform = controller.platform();
    let camera = platform.record("CGO3P_9F21").unwrap();
    assert!(camera.is_current());
    assert_eq!(camera.priority, 1);
    assert_eq!(
        camera.pre_shared_key.as_ref().unwrap().expose_secret(),
        "1234567890"
    );
    assert!(!platform.record("HomeNet").unwrap().is_enabled());
    assert!(!platform.record("CGO3P_old").unwrap().is_enabled());

    drop(lease);
    let state = host.state();
    assert_eq!(state.wake_lock, None);
    assert_eq!(state.spoken, vec!["Camera bound".to_string()]);
}

#[tokio::test]
async fn reset_after_bind_leaves_everything_disabled() {
    let platform = SimulatedPlatform::new()
        .with_network("CGOPRO_X", 5, NetworkStatus::Enabled)
        .with_access_point("CGOPRO_X", -40, None);
    let (tx, mut rx) = unbounded_channel();
    let mut session = Session::start(
        platform,
        ChannelListener::new(tx),
        SimulatedHost::new(),
        ControllerConfig::default(),
    );

    let controller = session.controller_mut();
    controller.reconnect();
    for event in controller.platform_mut().drain_events() {
        controller.dispatch(event);
    }
    assert_eq!(controller.current_connection_id(), "CGOPRO_X");
    drain(&mut rx);

    controller.reset_all_networks();
    controller.reset_all_networks();
    assert_eq!(
        drain(&mut rx),
        vec![ControllerEvent::SignalUpdated, ControllerEvent::Disconnected]
    );
    assert_eq!(controller.current_connection_id(), "");
    assert_eq!(controller.current_rssi(), 0);
    assert!(controller.platform().records().iter().all(|r| !r.is_enabled()));
}
