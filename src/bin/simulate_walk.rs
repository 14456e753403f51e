use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::{Sender, bounded, unbounded};
use rolling_stats::Stats;

use wayfinder::config::{AdvanceMode, NavConfig, StrideLength};
use wayfinder::engine::{self, EngineCommand, EngineOutput};
use wayfinder::graph::{Building, Graph, Pathfinder};
use wayfinder::navigation::{NavEvent, Navigator, WaypointSchedule};
use wayfinder::output::{OutputFormat, create_formatter};
use wayfinder::sensors::SensorEvent;
use wayfinder::simulation::{WalkConfig, simulate_walk};

#[derive(Parser, Debug)]
#[command(name = "simulate_walk")]
#[command(about = "Walk a route with synthetic sensors and print navigation events", long_about = None)]
struct Args {
    /// Start node id
    #[arg(default_value = "101")]
    from: String,

    /// Destination node id
    #[arg(default_value = "204")]
    to: String,

    /// Bundled building map
    #[arg(short = 'b', long, value_enum, default_value = "college")]
    building: Building,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Waypoint advancement: fixed-steps, stride-length
    #[arg(short = 'm', long, value_enum)]
    mode: Option<AdvanceMode>,

    /// Stride length (e.g., "0.7", "70cm")
    #[arg(long)]
    stride: Option<StrideLength>,

    /// Random seed for sensor noise
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Steps per second
    #[arg(long, default_value = "1.8")]
    cadence: f64,

    /// Accelerometer noise in g
    #[arg(long, default_value = "0.02")]
    accel_noise: f64,

    /// Heading noise in degrees
    #[arg(long, default_value = "2.0")]
    heading_noise: f64,

    /// Replay samples at walking pace instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print turn guidance as it changes
    #[arg(long)]
    guidance: bool,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn spawn_producer(
    name: &str,
    events: Vec<SensorEvent>,
    tx: Sender<SensorEvent>,
    realtime: bool,
) -> anyhow::Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut last = Duration::ZERO;
            for event in events {
                if realtime && let Some(t) = event.timestamp() {
                    thread::sleep(t.saturating_sub(last));
                    last = t;
                }
                if tx.send(event).is_err() {
                    break;
                }
            }
        })?;
    Ok(handle)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NavConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.progress.mode = mode;
    }
    if let Some(stride) = args.stride {
        config.progress.stride_length = stride;
    }
    config.validate()?;

    let graph = Arc::new(Graph::bundled(args.building)?);
    let route = Pathfinder::new(&config.route)
        .find_path(&graph, &args.from, &args.to)
        .with_context(|| format!("No route from {} to {}", args.from, args.to))?;
    let schedule = WaypointSchedule::for_route(&route, &config.progress);

    let walk_config = WalkConfig {
        seed: args.seed,
        cadence_hz: args.cadence,
        accel_noise_g: args.accel_noise,
        heading_noise_deg: args.heading_noise,
        ..WalkConfig::default()
    }
    .with_sample_periods(&config);
    let walk = simulate_walk(&route, &schedule, &walk_config)?;

    println!("=== Wayfinder - Simulated Walk ===");
    println!("Route: {}", route.summary());
    println!("Distance: {:.1} m", route.total_distance());
    match config.progress.mode {
        AdvanceMode::FixedSteps => println!(
            "Advance: every {} steps",
            config.progress.steps_per_waypoint
        ),
        AdvanceMode::StrideLength => {
            println!("Advance: stride {}", config.progress.stride_length)
        }
    }
    println!(
        "Simulating {} strides over {:.1} s",
        walk.steps,
        walk.duration.as_secs_f64()
    );
    println!();

    let (accel_tx, accel_rx) = bounded(64);
    let (mag_tx, mag_rx) = bounded(64);
    let (control_tx, control_rx) = unbounded();
    let (output_tx, output_rx) = unbounded();

    let (step_tx, step_rx) = unbounded();
    let mut navigator = Navigator::new(config);
    navigator.step_detector_mut().subscribe(move |step| {
        let _ = step_tx.send(step.timestamp);
    });

    let engine_handle = thread::Builder::new()
        .name("engine".to_string())
        .spawn(move || engine::run(navigator, accel_rx, mag_rx, control_rx, output_tx))?;

    control_tx.send(EngineCommand::Route {
        graph: Arc::clone(&graph),
        start: args.from.clone(),
        end: args.to.clone(),
    })?;

    // Hold samples back until the engine has a session
    let formatter = create_formatter(args.format, args.verbose > 0);
    for output in output_rx.iter() {
        if let EngineOutput::Event(event) = &output {
            println!("{}", formatter.format_event(event));
            if matches!(event, NavEvent::RouteStarted { .. }) {
                break;
            }
            if matches!(event, NavEvent::RouteNotFound { .. }) {
                anyhow::bail!("Engine could not plan the route");
            }
        }
    }

    let accel_handle = spawn_producer("accelerometer", walk.accelerometer, accel_tx, args.realtime)?;
    let mag_handle = spawn_producer("magnetometer", walk.magnetometer, mag_tx, args.realtime)?;
    drop(control_tx);

    let mut last_direction = None;
    for output in output_rx.iter() {
        match output {
            EngineOutput::Event(event) => {
                if !matches!(event, NavEvent::StepCounted { .. }) || args.verbose > 1 {
                    println!("{}", formatter.format_event(&event));
                }
            }
            EngineOutput::Guidance(guidance) => {
                if args.guidance && last_direction != Some(guidance.direction) {
                    println!("{}", formatter.format_guidance(&guidance));
                    last_direction = Some(guidance.direction);
                }
            }
        }
    }

    let _ = accel_handle.join();
    let _ = mag_handle.join();
    let navigator = engine_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Engine thread panicked"))?;

    let step_times: Vec<Duration> = step_rx.try_iter().collect();
    let mut intervals: Stats<f64> = Stats::new();
    for pair in step_times.windows(2) {
        intervals.update((pair[1] - pair[0]).as_secs_f64() * 1000.0);
    }

    println!();
    println!("State: {:?}", navigator.state());
    println!("Steps counted: {} of {}", navigator.steps_walked(), walk.steps);
    if intervals.count > 0 {
        println!(
            "Step interval: {:.0} ms mean, {:.0} ms std dev, {:.0}-{:.0} ms",
            intervals.mean, intervals.std_dev, intervals.min, intervals.max
        );
    }

    Ok(())
}
