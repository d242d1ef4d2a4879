//! CLI for turbine-relay
//!
//! Subcommands:
//! - `serve`: relay telemetry from the serial port (or the simulator) to
//!   WebSocket dashboards
//! - `emulate`: play the turbine, writing simulated records to a serial device
//! - `watch`: connect to a running relay and log what a dashboard would see

use std::process::ExitCode;

use clap::{Args, Parser};
use tracing::{error, info};

use turbine_relay::config::{Settings, load_config};
use turbine_relay::history::{DEFAULT_CAPACITY, watch};
use turbine_relay::hub::Hub;
use turbine_relay::relay;
use turbine_relay::source::{TelemetrySource, emulate};
use turbine_relay::transport::start_websocket_server;
use turbine_relay::utils::{Result, logging};

#[derive(Parser)]
#[command(name = "turbine-relay", version, about)]
enum Command {
    /// Relay turbine telemetry to WebSocket dashboards
    Serve(ServeArgs),
    /// Emulate the turbine: write simulated records to a serial device
    Emulate {
        /// Serial device to write to, e.g. one end of a virtual serial pair
        #[arg(long)]
        device: Option<String>,
        /// Serial baud rate
        #[arg(long)]
        baud: Option<u32>,
    },
    /// Watch a running relay from the terminal
    Watch {
        /// Relay URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:3000")]
        url: String,
        /// Number of records kept for the running average
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        history: usize,
    },
}

/// Command-line overrides, applied on top of the loaded configuration.
#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Generate synthetic telemetry instead of reading the serial port
    #[arg(long)]
    simulate: bool,
    /// Serial device path, e.g. /dev/ttyUSB0 or COM6
    #[arg(long)]
    device: Option<String>,
    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,
    /// WebSocket listening port
    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    fn apply(self, settings: &mut Settings) {
        if self.simulate {
            settings.source.simulate = true;
        }
        if let Some(path) = self.device {
            settings.serial.path = path;
        }
        if let Some(baud) = self.baud {
            settings.serial.baud_rate = baud;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = Command::parse();

    let mut settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info", false);
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.logging.level, settings.logging.json);

    let outcome = match cmd {
        Command::Serve(args) => {
            args.apply(&mut settings);
            run_server(settings).await
        }
        Command::Emulate { device, baud } => {
            ServeArgs {
                device,
                baud,
                ..ServeArgs::default()
            }
            .apply(&mut settings);
            emulate(&settings.serial, settings.source.interval()).await
        }
        Command::Watch { url, history } => watch(&url, history).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "turbine-relay failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(settings: Settings) -> Result<()> {
    let addr = settings.server.address();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        simulate = settings.source.simulate,
        device = %settings.serial.path,
        baud_rate = settings.serial.baud_rate,
        "Starting turbine-relay"
    );

    let hub = Hub::new(settings.hub.max_subscribers).shared();
    let source = TelemetrySource::open(&settings.serial, &settings.source);

    tokio::select! {
        served = start_websocket_server(&addr, hub.clone()) => served,
        relayed = relay::run(source, hub) => relayed,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
            Ok(())
        }
    }
}
