use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use karting_common::Transform;
use karting_input::{Action, InputFrame};
use karting_kernel::{Clock, ManualClock, Phase, RaceConfig, RaceSim, TrafficLight};
use karting_render::{ChaseCamera, DebugTextRenderer, Renderer, SceneFrame};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "karting-cli", about = "Headless tools for the kart racing demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Race configuration (YAML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and race layout
    Info,
    /// Run a full race with the player on autopilot (throttle held)
    Race {
        /// Give up after this many ticks
        #[arg(short, long, default_value = "100000")]
        max_ticks: u64,
        /// Only hold the throttle once the light is green
        #[arg(long)]
        wait_for_green: bool,
    },
    /// Print the start light's phase timeline
    Lights {
        /// Sampling interval in seconds
        #[arg(short, long, default_value = "0.5")]
        step: f64,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => RaceConfig::load(path)
            .with_context(|| format!("loading race config {}", path.display()))?,
        None => RaceConfig::default(),
    };

    match cli.command {
        Commands::Info => info(&config),
        Commands::Race {
            max_ticks,
            wait_for_green,
        } => race(config, max_ticks, wait_for_green)?,
        Commands::Lights { step } => lights(&config, step)?,
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}

fn info(config: &RaceConfig) {
    println!("karting-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("tick rate: {} Hz", config.tick_rate_hz);
    println!(
        "lights: start after {}s, red {}s, yellow {}s, green {}s",
        config.lights.start_delay,
        config.lights.timings.red,
        config.lights.timings.yellow,
        config.lights.timings.green
    );
    println!("finish plane: z={}", config.finish_line.z);
    for kart in std::iter::once(&config.player).chain(&config.ghosts) {
        println!(
            "  {:<8} max {:.4} accel {:.5} start ({:.2}, {:.2}, {:.2})",
            kart.name,
            kart.max_speed,
            kart.acceleration,
            kart.position.x,
            kart.position.y,
            kart.position.z
        );
    }
}

fn race(config: RaceConfig, max_ticks: u64, wait_for_green: bool) -> anyhow::Result<()> {
    let dt = config.tick_seconds();
    let (width, height) = (config.window.width, config.window.height);
    let mut sim = RaceSim::new(config);
    let mut clock = ManualClock::new(0.0);
    let mut camera = ChaseCamera::new(clock.now());

    let mut throttle = InputFrame::new();
    throttle.press(Action::Throttle);
    throttle.consume_edges();
    let coast = InputFrame::new();

    while !sim.exit_requested() {
        if sim.tick_count() >= max_ticks {
            bail!("race still running after {max_ticks} ticks");
        }
        clock.advance(dt);
        let input = if wait_for_green && !sim.context().race_started {
            &coast
        } else {
            &throttle
        };
        sim.tick(clock.now(), input)?;

        for event in sim.drain_events() {
            if event.is_console() {
                println!("{event}");
            } else {
                tracing::info!("{event}");
            }
        }
    }

    camera.follow(sim.player(), width, height);
    let scene = SceneFrame::capture(&sim);
    println!();
    print!("{}", DebugTextRenderer::new().render(&scene, &camera.render_view()));
    tracing::info!(ticks = sim.tick_count(), seconds = clock.now(), "race complete");
    Ok(())
}

fn lights(config: &RaceConfig, step: f64) -> anyhow::Result<()> {
    if !(step.is_finite() && step > 0.0) {
        bail!("step must be a positive number of seconds");
    }
    let mut light = TrafficLight::new(
        Transform::at(config.lights.position).with_uniform_scale(config.lights.size),
        config.lights.timings,
    );
    let start = config.lights.start_delay;
    light.start(start);

    let end = start + config.lights.timings.total() + 1.0;
    let mut now = start;
    println!("{:>8}  {:<7} {:>10}  color", "time", "phase", "intensity");
    while now <= end {
        let changed = light.update(now);
        let c = light.light().color();
        println!(
            "{:>8.2}  {:<7} {:>10.0}  ({:.2}, {:.2}, {:.2}){}",
            now,
            light.phase(),
            light.light().intensity(),
            c.x,
            c.y,
            c.z,
            if changed.is_some() { "  <-" } else { "" }
        );
        if light.phase() == Phase::Green && changed.is_some() {
            println!("          green: race starts");
        }
        now += step;
    }
    Ok(())
}
