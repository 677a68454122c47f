//! MEMS 2J ECU Simulator
//!
//! Answers a diagnostic tool on the K-Line as if it were the engine ECU.
//!
//! # Usage
//!
//! Zero payload for every sensor:
//! ```bash
//! mems-ecu-sim --port /dev/ttyUSB0
//! ```
//!
//! Simulate engine speed (sensor 0x08) and coolant temperature (0x05):
//! ```bash
//! mems-ecu-sim --port /dev/ttyUSB0 08 0BB8 05 0050
//! ```

use std::fmt;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

use mems_ecu_sim::config::{Backend, SimulatorConfig, TransportOverrides, DEFAULT_BAUD_RATE};
use mems_ecu_sim::protocol::SENSOR_CATALOG;
use mems_ecu_sim::transport;
use mems_ecu_sim::{parse_override_args, CommandHandler};

#[derive(Parser, Debug)]
#[command(name = "mems-ecu-sim")]
#[command(about = "MEMS 2J engine ECU simulator for diagnostic tool development")]
struct Args {
    /// Simulated sensor values as hex pairs: SENSOR VALUE [SENSOR VALUE ...]
    #[arg(value_name = "SENSOR VALUE")]
    overrides: Vec<String>,

    /// Configuration file path (JSON format)
    #[arg(short, long)]
    config: Option<String>,

    /// Cable driver
    #[arg(short, long, value_enum, ignore_case = true)]
    backend: Option<Backend>,

    /// Serial device path (serial backend)
    #[arg(short, long)]
    port: Option<String>,

    /// FTDI device index (ftdi backend)
    #[arg(long)]
    device_index: Option<i32>,

    /// Baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Read timeout in milliseconds
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Write timeout in milliseconds
    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// Print the supported sensor catalog and exit
    #[arg(long)]
    list_sensors: bool,

    /// Print available serial ports / FTDI devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Enable verbose output (per-byte input and raw TX/RX)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn transport_overrides(&self) -> TransportOverrides {
        TransportOverrides {
            backend: self.backend,
            port: self.port.clone(),
            device_index: self.device_index,
            baud_rate: self.baud,
            read_timeout_ms: self.read_timeout_ms,
            write_timeout_ms: self.write_timeout_ms,
        }
    }
}

/// `[Thu Oct 16 08:09:00 2026]` local timestamps
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", Local::now().format("%c"))
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "mems_ecu_sim=debug"
    } else {
        "mems_ecu_sim=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTimestamp)
        .compact()
        .init();
}

fn print_sensors() {
    println!("Supported sensor reads (service 0x21):");
    for sensor in &SENSOR_CATALOG {
        let overridable = if sensor.accepts_override() {
            "overridable"
        } else {
            ""
        };
        println!(
            "  0x{:02X}  {} bytes  {:<28} {}",
            sensor.sensor_id, sensor.payload_length, sensor.name, overridable
        );
    }
}

fn print_devices() -> Result<()> {
    let ports = transport::list_ports().context("Failed to list serial ports")?;
    println!("Found {} serial port(s):", ports.len());
    for port in &ports {
        let ftdi = if port.is_ftdi { " [FTDI]" } else { "" };
        println!("  {} ({}){}", port.name, port.port_type, ftdi);
    }

    #[cfg(feature = "ftdi")]
    {
        let devices = transport::ftdi::list_devices().context("Failed to list FTDI devices")?;
        println!("Found {} FTDI device(s):", devices.len());
        for dev in &devices {
            println!("  [{}] {} - {}", dev.index, dev.description, dev.serial_number);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║     MEMS 2J Simulator                                 ║");
    println!("║     K-Line ECU emulation for diagnostic tools         ║");
    println!("╚═══════════════════════════════════════════════════════╝");
    println!();

    if args.list_sensors {
        print_sensors();
        return Ok(());
    }

    if args.list_devices {
        return print_devices();
    }

    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path);
            SimulatorConfig::load(path).context("Failed to load config")?
        }
        None => SimulatorConfig::default(),
    };

    // Command-line flags win over the config file
    config
        .apply_cli(&args.transport_overrides())
        .context("Invalid transport settings")?;

    // File and command-line overrides form one table
    let cli_pairs =
        parse_override_args(args.overrides.as_slice()).context("Invalid override arguments")?;
    let overrides = config
        .response_overrides(cli_pairs)
        .context("Invalid sensor overrides")?;

    if config.transport.baud_rate != DEFAULT_BAUD_RATE {
        warn!(
            "Baud rate {} differs from the K-Line default of {}",
            config.transport.baud_rate, DEFAULT_BAUD_RATE
        );
    }

    let link = transport::connect(&config.transport).context("Failed to open transport")?;

    let mut handler = CommandHandler::new(link, overrides);

    if handler.overrides().is_empty() {
        info!("No sensor overrides: every sensor reads zero");
    }
    for (sensor_id, value) in handler.overrides().iter() {
        info!("Sensor 0x{:02X} -> 0x{:04X}", sensor_id, value);
    }

    handler.run()
}
