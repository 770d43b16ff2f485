use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use log::{debug, warn};
use shared::{ConfigStorage, ROBOT_CONFIG_NAME};
use telemetry::VectorPublisher;
use vision::{ImageFileSource, LocatorConfig, TargetLocator, VisionModule};

/// Command line arguments for the co-processor vision server
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Locate the target in image files and publish the vectors",
    long_about = "Runs the target locator on a sequence of image files in a loop and \
        publishes one telemetry frame per image to every connected robot. Useful for \
        bench testing the robot side without a camera: drop captured frames in a \
        directory and point the server at them."
)]
struct Args {
    #[arg(required = true, help = "Image files to cycle through")]
    images: Vec<PathBuf>,

    #[arg(
        short,
        long,
        default_value = "0.0.0.0:7123",
        help = "Address to listen on"
    )]
    bind: String,

    #[arg(
        short,
        long,
        default_value_t = 33,
        help = "Delay between frames in milliseconds"
    )]
    period_ms: u64,

    #[arg(
        short = 'n',
        long,
        help = "Stop after publishing this many frames (runs until killed if omitted)"
    )]
    frames: Option<u64>,

    #[arg(long, help = "Config directory (defaults to ~/.aim_config)")]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.images.is_empty() {
        bail!("No images given");
    }

    let storage = match args.config_dir {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let locator_config: LocatorConfig = storage.load_section(ROBOT_CONFIG_NAME, "locator")?;

    let mut modules: Vec<_> = args
        .images
        .iter()
        .map(|path| {
            VisionModule::new(
                ImageFileSource::new(path),
                TargetLocator::new(locator_config.clone()),
            )
        })
        .collect();

    let mut publisher = VectorPublisher::bind(&args.bind)?;
    let period = Duration::from_millis(args.period_ms);
    let mut published: u64 = 0;

    while args.frames.map_or(true, |limit| published < limit) {
        let index = (published % modules.len() as u64) as usize;
        let module = &mut modules[index];

        let vector = match module.process_image() {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Skipping frame: {e}");
                None
            }
        };
        let clients = publisher.publish(vector.as_ref());
        debug!("Frame {published}: {vector:?} -> {clients} client(s)");

        published += 1;
        thread::sleep(period);
    }

    Ok(())
}
