use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use shared::{CameraGeometry, ConfigStorage, ROBOT_CONFIG_NAME};
use vision::{ImageFileSource, LocatorConfig, Report, TargetLocator, VisionModule};

/// Command line arguments for the target locator
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Locate the goal target in an image file",
    long_about = "Runs the target locator on a single image and prints the offset vector, \
        the rotation needed to face the target and the estimated distance to it.\n\n\
        Thresholds and camera mounting are read from the 'locator' and 'camera' \
        sections of the 'robot' document in the config directory; built-in defaults \
        are used for any section that does not exist."
)]
struct Args {
    #[arg(help = "Image file to process")]
    image: PathBuf,

    #[arg(
        short,
        long,
        help = "Write the annotated frame to this path",
        long_help = "Write a copy of the frame with the target outlined and its center \
            circled. The file type follows the extension (png, jpg, ...)."
    )]
    save: Option<PathBuf>,

    #[arg(
        short,
        long,
        default_value_t = 0,
        help = "Time this many locator runs and print the average"
    )]
    iterations: u32,

    #[arg(
        long,
        help = "Config directory (defaults to ~/.aim_config)"
    )]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let storage = match args.config_dir {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let locator_config: LocatorConfig = storage.load_section(ROBOT_CONFIG_NAME, "locator")?;
    let geometry: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "camera")?;
    info!("Using config from {}", storage.root_path().display());

    let mut module = VisionModule::new(
        ImageFileSource::new(&args.image),
        TargetLocator::new(locator_config),
    );

    let vector = match &args.save {
        Some(path) => module.process_image_and_save(path),
        None => module.process_image(),
    }
    .with_context(|| format!("Failed to process {}", args.image.display()))?;

    match vector {
        Some(vector) => println!("{}", Report::new(vector, &geometry)),
        None => println!("No target found"),
    }

    if args.iterations > 0 {
        let average = module.average_processing_time(args.iterations)?;
        println!(
            "Average processing time over {} runs: {:.2} ms",
            args.iterations,
            average.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
