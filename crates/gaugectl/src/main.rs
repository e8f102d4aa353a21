//! gaugectl - Measurement instrument CLI
//!
//! Take readings from Mitutoyo USB-ITN connected instruments: list devices,
//! query identification, read measurements once or continuously.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opengauge_driver::{DriverConfig, GaugeDriver, GaugeSink};
use opengauge_itn_protocol::{MITUTOYO_VENDOR_ID, USB_ITN_PRODUCT_ID, UnitScale};
use opengauge_usb_common::UsbItnTransport;

#[derive(Parser)]
#[command(name = "gaugectl")]
#[command(about = "Read Mitutoyo USB-ITN measurement instruments")]
#[command(version)]
struct Cli {
    /// Vendor ID (hex, e.g. 0x0FE7)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    vid: Option<u16>,

    /// Product ID (hex, e.g. 0x4001)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected instruments
    List,
    /// Print the device identification string
    Info,
    /// Take measurement readings
    Read {
        /// Number of readings to take (0 for continuous)
        #[arg(short = 'n', long, default_value = "1")]
        count: u64,
        /// Seconds between readings
        #[arg(short = 't', long, default_value = "1.0")]
        interval: f64,
        /// Report whole micrometres instead of millimetres
        #[arg(long)]
        micrometers: bool,
    },
    /// Poll forever, printing every message the instrument sends
    Monitor {
        /// Report whole micrometres instead of millimetres
        #[arg(long)]
        micrometers: bool,
    },
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

struct PrintSink {
    unit: UnitScale,
}

impl GaugeSink for PrintSink {
    fn on_measurement(&mut self, value: f64) {
        match self.unit {
            UnitScale::Millimeters => println!("{value} mm"),
            UnitScale::Micrometers => println!("{value} um"),
        }
    }

    fn on_device_info(&mut self, info: &str) {
        println!("Device: {info}");
    }

    fn on_status(&mut self, status: &str) {
        println!("Status: {status}");
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn list_devices(vid: u16, pid: u16) -> Result<()> {
    let devices = rusb::devices().context("Failed to enumerate USB devices")?;
    let mut found = 0usize;
    for device in devices.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };
        if descriptor.vendor_id() == vid && descriptor.product_id() == pid {
            println!(
                "Bus {:03} Device {:03}: ID {:04x}:{:04x}",
                device.bus_number(),
                device.address(),
                descriptor.vendor_id(),
                descriptor.product_id(),
            );
            found += 1;
        }
    }
    if found == 0 {
        println!("No matching instruments found (ID {vid:04x}:{pid:04x}).");
    }
    Ok(())
}

fn open_transport(vid: u16, pid: u16) -> Result<UsbItnTransport> {
    UsbItnTransport::open(vid, pid)
        .with_context(|| format!("Failed to open instrument VID=0x{vid:04X} PID=0x{pid:04X}"))
}

fn show_info(vid: u16, pid: u16) -> Result<()> {
    let mut transport = open_transport(vid, pid)?;
    let mut driver = GaugeDriver::new(DriverConfig::default());
    let info = driver
        .read_device_info(&mut transport)
        .context("No identification response from instrument")?;
    println!("Device: {info}");
    Ok(())
}

fn run_read(vid: u16, pid: u16, count: u64, interval: f64, micrometers: bool) -> Result<()> {
    let unit = if micrometers {
        UnitScale::Micrometers
    } else {
        UnitScale::Millimeters
    };
    let mut transport = open_transport(vid, pid)?;
    let mut driver = GaugeDriver::new(DriverConfig::default().with_unit_scale(unit));
    let mut sink = PrintSink { unit };

    let mut taken = 0u64;
    loop {
        let value = driver
            .read_measurement(&mut transport)
            .context("No measurement response from instrument")?;
        sink.on_measurement(value);

        taken += 1;
        if count != 0 && taken >= count {
            break;
        }
        std::thread::sleep(Duration::from_secs_f64(interval));
    }
    Ok(())
}

fn run_monitor(vid: u16, pid: u16, micrometers: bool) -> Result<()> {
    let unit = if micrometers {
        UnitScale::Micrometers
    } else {
        UnitScale::Millimeters
    };
    let mut transport = open_transport(vid, pid)?;
    let mut driver = GaugeDriver::new(DriverConfig::default().with_unit_scale(unit));
    driver.set_sink(Box::new(PrintSink { unit }));

    // Frames arrive when the operator presses the instrument's data switch;
    // keep draining until interrupted.
    loop {
        driver.poll(&mut transport)?;
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let vid = cli.vid.unwrap_or(MITUTOYO_VENDOR_ID);
    let pid = cli.pid.unwrap_or(USB_ITN_PRODUCT_ID);

    match cli.command {
        Commands::List => list_devices(vid, pid),
        Commands::Info => show_info(vid, pid),
        Commands::Read {
            count,
            interval,
            micrometers,
        } => run_read(vid, pid, count, interval, micrometers),
        Commands::Monitor { micrometers } => run_monitor(vid, pid, micrometers),
    }
}
