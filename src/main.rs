use camlink::{
    ChannelListener, ControllerConfig, ControllerEvent, Session, SimulatedHost,
    wifi::{
        ControllerHandle, NetworkStatus, SimulatedPlatform, WifiController, WifiListener, service,
    },
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use secrecy::SecretString;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing_subscriber::EnvFilter;

// Upper bound on broadcast rounds the simulator relays per command
const MAX_PUMP_ROUNDS: usize = 16;

/// Pair with a camera access point against a simulated WiFi platform
#[derive(Parser, Debug)]
#[command(
    name = "camlink",
    about = "Drive the camera WiFi binding controller against a simulated platform.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// Stored network configuration (repeatable)
    #[arg(long = "known", value_name = "SSID")]
    known: Vec<String>,

    /// Stored network the radio is associated with at startup
    #[arg(long, value_name = "SSID")]
    current: Option<String>,

    /// Access point in range, as SSID[:LEVEL[:PASSPHRASE]] (repeatable)
    #[arg(long = "ap", value_name = "AP", value_parser = parse_access_point)]
    access_points: Vec<AccessPointArg>,

    /// Start with the radio powered off
    #[arg(long)]
    radio_off: bool,

    /// Camera SSID prefix (repeatable, replaces the defaults)
    #[arg(long = "camera-prefix", value_name = "PREFIX")]
    camera_prefixes: Vec<String>,

    /// Log filter, e.g. `info` or `camlink=debug` (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan and list access points in range
    Scan,
    /// Bind to a network, adding it if needed
    Bind {
        ssid: String,
        passphrase: String,
    },
    /// Disconnect and disable every stored network
    Reset,
    /// Show the cached connection state after startup
    Status,
}

#[derive(Debug, Clone)]
struct AccessPointArg {
    ssid: String,
    level: i32,
    passphrase: Option<String>,
}

fn parse_access_point(value: &str) -> Result<AccessPointArg, String> {
    let mut parts = value.splitn(3, ':');
    let ssid = parts.next().unwrap_or_default().to_string();
    if ssid.is_empty() {
        return Err("SSID must not be empty".to_string());
    }
    let level = match parts.next() {
        Some(level) => level
            .parse::<i32>()
            .map_err(|e| format!("invalid level '{level}': {e}"))?,
        None => -50,
    };
    let passphrase = parts.next().map(str::to_string);
    Ok(AccessPointArg {
        ssid,
        level,
        passphrase,
    })
}

fn build_platform(args: &Args) -> SimulatedPlatform {
    let mut platform = SimulatedPlatform::new().with_radio(!args.radio_off);
    for ssid in &args.known {
        let status = if args.current.as_deref() == Some(ssid.as_str()) {
            NetworkStatus::Current
        } else {
            NetworkStatus::Enabled
        };
        platform = platform.with_network(ssid, 5, status);
    }
    for ap in &args.access_points {
        platform = platform.with_access_point(&ap.ssid, ap.level, ap.passphrase.as_deref());
    }
    platform
}

/// Relay broadcasts raised by the simulated platform until it goes quiet
async fn pump<L: WifiListener>(handle: &ControllerHandle<SimulatedPlatform, L>) -> Result<()> {
    for _ in 0..MAX_PUMP_ROUNDS {
        let events = handle
            .with_controller(|c: &mut WifiController<SimulatedPlatform, L>| {
                c.platform_mut().drain_events()
            })
            .await?;
        if events.is_empty() {
            break;
        }
        for event in events {
            handle.dispatch(event).await?;
        }
    }
    Ok(())
}

fn print_events(rx: &mut UnboundedReceiver<ControllerEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            ControllerEvent::NetworkDiscovered { ssid, level } => {
                println!("  {ssid:<32} {level:>4} dBm")
            }
            ControllerEvent::ScanComplete => println!("scan complete"),
            ControllerEvent::AuthError => println!("authentication error"),
            ControllerEvent::Connected => println!("connected"),
            ControllerEvent::Disconnected => println!("disconnected"),
            ControllerEvent::SignalUpdated | ControllerEvent::BatteryUpdated => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --log-level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    color_eyre::install()?;

    let mut config = ControllerConfig::default();
    if !args.camera_prefixes.is_empty() {
        config = config.with_camera_prefixes(args.camera_prefixes.iter().cloned());
    }

    let platform = build_platform(&args);

    let (tx, mut rx) = unbounded_channel();
    let session = Session::start(platform, ChannelListener::new(tx), SimulatedHost::new(), config);
    let (controller, mut lease) = session.into_parts();
    let (handle, task) = service::spawn(controller);

    match args.command {
        Command::Scan => handle.start_scan().await?,
        Command::Bind { ssid, passphrase } => {
            handle
                .bind_to_network(&ssid, SecretString::from(passphrase))
                .await?
        }
        Command::Reset => handle.reset_all_networks().await?,
        Command::Status => {}
    }
    pump(&handle).await?;
    print_events(&mut rx);

    let snapshot = handle.snapshot().await?;
    if snapshot.state.ssid.is_empty() {
        println!("active: <none>");
    } else {
        println!("active: {} ({} dBm)", snapshot.state.ssid, snapshot.state.rssi);
        lease.say(&format!("Connected to {}", snapshot.state.ssid));
    }

    drop(handle);
    let controller = task.await?;
    for record in controller.platform().records() {
        println!(
            "  {:<32} priority {:>2} {:?}",
            record.ssid, record.priority, record.status
        );
    }
    Ok(())
}
