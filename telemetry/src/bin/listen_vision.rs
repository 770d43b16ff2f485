use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::info;
use shared::{CameraGeometry, ConfigStorage, ROBOT_CONFIG_NAME};
use telemetry::{TelemetryChannel, TelemetryConfig};

/// Command line arguments for the telemetry listener
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Listen to the vision co-processor and print the latest target",
    long_about = "Starts a telemetry channel to the vision co-processor and prints the latest \
        offset vector, the rotation needed to face it and the connection status at a fixed \
        interval. The channel reconnects on its own, so the co-processor may be started \
        or restarted at any time."
)]
struct Args {
    #[arg(
        short,
        long,
        help = "Co-processor address (host:port), overrides the 'telemetry' section of the robot config"
    )]
    address: Option<String>,

    #[arg(
        short,
        long,
        default_value_t = 500,
        help = "Print interval in milliseconds"
    )]
    interval_ms: u64,

    #[arg(
        short,
        long,
        help = "Stop after this many seconds (runs until killed if omitted)"
    )]
    duration: Option<f64>,

    #[arg(long, help = "Config directory (defaults to ~/.aim_config)")]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let storage = match args.config_dir {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let mut config: TelemetryConfig = storage.load_section(ROBOT_CONFIG_NAME, "telemetry")?;
    if let Some(address) = args.address {
        config.address = address;
    }
    let geometry: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "camera")?;

    info!("Listening for vision telemetry from {}", config.address);
    let mut channel = TelemetryChannel::new(config);
    channel.start()?;

    let start = Instant::now();
    let interval = Duration::from_millis(args.interval_ms);
    loop {
        let latest = channel.latest();
        match (latest, geometry.degrees_to_target(latest.as_ref())) {
            (Some(vector), Some(degrees)) => println!(
                "[{:?}] {} -> {:.2} deg, {:.1} in",
                channel.status(),
                vector,
                degrees,
                geometry.distance_to_goal(vector.dy)
            ),
            _ => println!("[{:?}] no target", channel.status()),
        }

        if args
            .duration
            .is_some_and(|limit| start.elapsed().as_secs_f64() >= limit)
        {
            break;
        }
        thread::sleep(interval);
    }

    channel.shutdown()?;
    Ok(())
}
