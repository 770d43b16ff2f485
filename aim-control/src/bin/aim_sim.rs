use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use aim_control::{
    AimPhase, AnglePolicy, FixedHeading, LogDiagnostics, RobotConfig, RotationalAim,
    SimulatedChassis, VisionTarget,
};
use anyhow::{bail, Result};
use clap::Parser;
use log::{info, warn};
use shared::ConfigStorage;
use telemetry::{TelemetryChannel, TelemetryConfig};
use vision::{ImageFileSource, TargetLocator, VisionModule};

/// Command line arguments for the aiming simulation
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run the rotational aim controller against a simulated chassis",
    long_about = "Runs the closed-loop rotational aim controller against an in-memory tank \
        chassis. The desired rotation comes from a fixed heading, from the target located \
        in a still image, or from the latest vector received over telemetry. Each control \
        cycle prints the simulated heading; the run ends when the controller finishes or \
        the tick limit is reached."
)]
struct Args {
    #[arg(
        long,
        allow_negative_numbers = true,
        conflicts_with_all = ["vision_image", "telemetry"],
        help = "Rotate by a fixed number of degrees (clockwise positive)"
    )]
    target_degrees: Option<f64>,

    #[arg(
        long,
        conflicts_with = "telemetry",
        help = "Aim at the target located in this image"
    )]
    vision_image: Option<PathBuf>,

    #[arg(
        long,
        help = "Aim at the target reported by the vision co-processor at this address (host:port)"
    )]
    telemetry: Option<String>,

    #[arg(
        long,
        default_value_t = 2000,
        help = "How long to wait for the first telemetry vector in milliseconds"
    )]
    wait_ms: u64,

    #[arg(long, help = "Use the gentle speed ramp")]
    gentle: bool,

    #[arg(long, help = "On-target tolerance in degrees, overrides the config")]
    tolerance: Option<f64>,

    #[arg(
        long,
        default_value_t = aim_control::sim::DEFAULT_TURN_RATE,
        help = "Simulated heading change per tick at full differential speed (degrees)"
    )]
    turn_rate: f64,

    #[arg(long, default_value_t = 500, help = "Give up after this many control cycles")]
    max_ticks: usize,

    #[arg(
        long,
        default_value_t = 20,
        help = "Control cycle period in milliseconds (0 runs as fast as possible)"
    )]
    tick_ms: u64,

    #[arg(
        long,
        help = "Trigger the force stop after this many control cycles"
    )]
    force_stop_after: Option<usize>,

    #[arg(long, help = "Config directory (defaults to ~/.aim_config)")]
    config_dir: Option<PathBuf>,
}

fn build_policy(args: &Args, config: &RobotConfig) -> Result<Box<dyn AnglePolicy>> {
    if let Some(degrees) = args.target_degrees {
        return Ok(Box::new(FixedHeading::new(degrees)));
    }

    if let Some(path) = &args.vision_image {
        let module = VisionModule::new(
            ImageFileSource::new(path),
            TargetLocator::new(config.locator.clone()),
        );
        return Ok(Box::new(VisionTarget::new(module, config.camera)));
    }

    if let Some(address) = &args.telemetry {
        let mut channel = TelemetryChannel::new(TelemetryConfig {
            address: address.clone(),
            ..config.telemetry.clone()
        });
        channel.start()?;

        let deadline = Instant::now() + Duration::from_millis(args.wait_ms);
        while channel.latest().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        if channel.latest().is_none() {
            warn!("No vector from {} yet, aiming without a target", address);
        }
        return Ok(Box::new(VisionTarget::new(channel, config.camera)));
    }

    bail!("One of --target-degrees, --vision-image or --telemetry is required")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let storage = match &args.config_dir {
        Some(path) => ConfigStorage::with_path(path.clone()),
        None => ConfigStorage::new()?,
    };
    let config = RobotConfig::load(&storage)?;

    let mut aim_config = config.aim_for_camera();
    aim_config.gentle |= args.gentle;
    if let Some(tolerance) = args.tolerance {
        aim_config.tolerance = tolerance;
    }

    let policy = build_policy(&args, &config)?;
    let chassis = SimulatedChassis::new(args.turn_rate);
    let mut aim = RotationalAim::new(chassis.handles(), policy, aim_config)
        .with_signal_lights(Box::new(chassis.clone()))
        .with_diagnostics(Box::new(LogDiagnostics));

    info!("Simulating aim with turn rate {:.2} deg/tick", args.turn_rate);
    let period = Duration::from_millis(args.tick_ms);
    let mut ticks = 0;
    while ticks < args.max_ticks {
        if args.force_stop_after == Some(ticks) {
            info!("Triggering force stop after {} ticks", ticks);
            aim.force_stop().stop();
        }

        let phase = aim.tick();
        ticks += 1;
        println!(
            "tick {:4}: heading {:7.2} deg, desired {:7.2} deg",
            ticks,
            aim_control::controller::normalize_heading(chassis.heading()),
            aim.desired_angle()
        );
        if phase == AimPhase::Done {
            break;
        }
        if !period.is_zero() {
            thread::sleep(period);
        }
    }

    if aim.phase() != AimPhase::Done {
        warn!("Tick limit reached, interrupting");
        aim.interrupt();
    }

    match aim.outcome() {
        Some(outcome) => println!("Finished after {} ticks: {}", ticks, outcome),
        None => println!("Did not finish after {} ticks", ticks),
    }
    Ok(())
}
