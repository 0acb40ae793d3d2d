//! `cobolt` - command line access to a Cobolt laser.
//!
//! ```text
//! cobolt --port /dev/ttyUSB0 info
//! cobolt --port /dev/ttyUSB0 set "Power Setpoint [mW]" 25
//! cobolt --mock 500-06-01-0100-100 fire 250
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use cobolt_laser::adapters::{HardwareAdapter, MockAdapter, SerialAdapterBuilder};
use cobolt_laser::config::{LaserConfig, DEFAULT_CONFIG_PATH};
use cobolt_laser::laser::{Laser, PropertySnapshot, Shutter};
use cobolt_laser::{LaserResult, LaserSession};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cobolt")]
#[command(about = "Query and control a Cobolt laser over its serial interface")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serial port, overrides `serial.port`
    #[arg(short, long)]
    port: Option<String>,

    /// Talk to a simulated laser reporting this model identifier
    #[arg(long, value_name = "MODEL")]
    mock: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every property with its current value
    Info {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Read one property
    Get { name: String },
    /// Write one property
    Set { name: String, value: String },
    /// Start emitting (laser must be on)
    Open,
    /// Stop emitting
    Close,
    /// Emit for the given number of milliseconds
    Fire { duration_ms: f64 },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = LaserConfig::load_from(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.application.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut session = LaserSession::default();
    let port = args
        .port
        .clone()
        .or_else(|| config.serial.port.clone())
        .or_else(|| args.mock.as_ref().map(|_| "mock".to_string()));
    if let Some(port) = port {
        session.set_port(port)?;
    }

    let mock = args.mock.clone();
    session
        .initialize(|port| connect(port, mock, &config))
        .context("Failed to initialize laser")?;

    let laser = session
        .laser_mut()
        .ok_or_else(|| anyhow!("Laser not initialized"))?;

    run(laser, args.command)?;

    session.shutdown();
    Ok(())
}

fn connect(
    port: &str,
    mock: Option<String>,
    config: &LaserConfig,
) -> LaserResult<Box<dyn HardwareAdapter>> {
    match mock {
        Some(model) => {
            info!("Using simulated laser '{}'", model);
            Ok(Box::new(MockAdapter::new(model).switched_on()))
        }
        None => {
            let adapter = SerialAdapterBuilder::from_config(port, &config.serial).open()?;
            Ok(Box::new(adapter))
        }
    }
}

fn run(laser: &mut Laser, command: Command) -> Result<()> {
    match command {
        Command::Info { json } => {
            let snapshots = laser.describe();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else {
                println!("{} ({} nm)", laser.name(), laser.wavelength());
                for snapshot in &snapshots {
                    println!("  {}", format_snapshot(snapshot));
                }
            }
        }
        Command::Get { name } => {
            let value = laser
                .get(&name)
                .with_context(|| format!("Failed to read '{}'", name))?;
            println!("{}", value);
        }
        Command::Set { name, value } => {
            laser
                .set(&name, &value)
                .with_context(|| format!("Failed to set '{}' to '{}'", name, value))?;
        }
        Command::Open => laser.open().context("Failed to open shutter")?,
        Command::Close => laser.close().context("Failed to close shutter")?,
        Command::Fire { duration_ms } => {
            laser
                .fire(duration_ms)
                .with_context(|| format!("Failed to fire for {} ms", duration_ms))?;
        }
    }

    if let Ok(state) = laser.state() {
        info!("Shutter state: {}", state);
    }
    Ok(())
}

fn format_snapshot(snapshot: &PropertySnapshot) -> String {
    let access = if snapshot.mutable { "rw" } else { "ro" };
    let value = match (&snapshot.value, &snapshot.error) {
        (Some(value), _) => value.to_string(),
        (None, Some(error)) => format!("<{}>", error),
        (None, None) => String::new(),
    };

    let mut line = format!("{:<28} {} = {}", snapshot.name, access, value);
    if let Some((min, max)) = snapshot.limits {
        line.push_str(&format!("  [{}, {}]", min, max));
    }
    if !snapshot.allowed_values.is_empty() {
        line.push_str(&format!("  {{{}}}", snapshot.allowed_values.join(", ")));
    }
    line
}
