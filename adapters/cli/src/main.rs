#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the antlife automaton in a terminal.

mod config;
mod terminal;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use antlife_core::CellCoord;
use antlife_rendering::{
    CanvasLayout, FrameControl, Palette, Presentation, RenderingBackend, Scene, DEFAULT_CELL_SIZE,
};
use antlife_system_bootstrap::{Bootstrap, Pattern, DEFAULT_DENSITY, DEFAULT_RANDOM_SEED};
use antlife_world::{self as world, Automaton, AutomatonConfig};
use clap::Parser;
use tracing::{info, warn};

use crate::{config::ConfigFile, terminal::TerminalBackend};

/// Command-line arguments for the antlife binary.
#[derive(Debug, Parser)]
#[command(
    name = "antlife",
    version,
    about = "Runs Conway's Game of Life with a Langton's ant on a torus"
)]
struct CliArgs {
    /// Optional TOML configuration file; flags override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of grid columns.
    #[arg(long)]
    width: Option<i64>,
    /// Number of grid rows.
    #[arg(long)]
    height: Option<i64>,
    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 32)]
    ticks: u64,
    /// Delay between frames in milliseconds.
    #[arg(long, default_value_t = 400)]
    interval_ms: u64,
    /// Initial pattern: empty, blinker, block, glider or random.
    #[arg(long)]
    pattern: Option<Pattern>,
    /// Fill ratio used by the random pattern.
    #[arg(long)]
    density: Option<f64>,
    /// Generator seed used by the random pattern.
    #[arg(long)]
    seed: Option<u64>,
    /// Keep the cells the agent departs from unchanged.
    #[arg(long)]
    no_trail: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Settings resolved from defaults, the config file and flags.
#[derive(Clone, Debug, PartialEq)]
struct RunSettings {
    automaton: AutomatonConfig,
    pattern: Pattern,
    origin: CellCoord,
    ticks: u64,
    frame_interval: Duration,
}

/// Entry point for the antlife command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level);

    let file = match &args.config {
        Some(path) => config::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = resolve(&args, &file)?;
    run(settings, TerminalBackend::new(io::stdout().lock()))
}

fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve(args: &CliArgs, file: &ConfigFile) -> Result<RunSettings> {
    let defaults = AutomatonConfig::default();
    let table = file.automaton;
    let width = args.width.or(table.width).unwrap_or(defaults.width);
    let height = args.height.or(table.height).unwrap_or(defaults.height);
    let automaton = AutomatonConfig {
        width,
        height,
        agent_row: table.agent_row.unwrap_or(height / 2),
        agent_column: table.agent_column.unwrap_or(width / 2),
        agent_direction: table.agent_direction.unwrap_or(defaults.agent_direction),
        trail_deposit: !args.no_trail && table.trail_deposit.unwrap_or(defaults.trail_deposit),
    };

    let pattern = match (&args.pattern, &file.seed.pattern) {
        (Some(pattern), _) => *pattern,
        (None, Some(name)) => name
            .parse::<Pattern>()
            .with_context(|| format!("invalid seed pattern `{name}` in config"))?,
        (None, None) => Pattern::default(),
    };
    let pattern = match pattern {
        Pattern::Random { .. } => {
            let density = args
                .density
                .or(file.seed.density)
                .unwrap_or(DEFAULT_DENSITY);
            if !(0.0..=1.0).contains(&density) {
                warn!(density, "random density outside 0..=1 will be clamped");
            }
            Pattern::Random {
                density,
                seed: args.seed.or(file.seed.seed).unwrap_or(DEFAULT_RANDOM_SEED),
            }
        }
        fixed => {
            if args.density.is_some() || args.seed.is_some() {
                warn!(%fixed, "density and seed only apply to the random pattern");
            }
            fixed
        }
    };

    let origin = CellCoord::new(
        file.seed.row.unwrap_or_else(|| centre(height)),
        file.seed.column.unwrap_or_else(|| centre(width)),
    );

    Ok(RunSettings {
        automaton,
        pattern,
        origin,
        ticks: args.ticks,
        frame_interval: Duration::from_millis(args.interval_ms),
    })
}

/// Anchor that roughly centres a three-cell pattern along an axis.
fn centre(extent: i64) -> u32 {
    u32::try_from((extent / 2 - 1).max(0)).unwrap_or(0)
}

fn run<B: RenderingBackend>(settings: RunSettings, backend: B) -> Result<()> {
    let mut automaton =
        Automaton::from_config(&settings.automaton).context("failed to build automaton")?;

    let mut commands = Vec::new();
    Bootstrap.handle(
        settings.pattern,
        settings.origin,
        automaton.width(),
        automaton.height(),
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut automaton, command, &mut events);
    }
    info!(
        width = automaton.width(),
        height = automaton.height(),
        pattern = %settings.pattern,
        seeded = events.len(),
        ticks = settings.ticks,
        "starting antlife"
    );

    let layout = CanvasLayout::new(automaton.width(), automaton.height(), DEFAULT_CELL_SIZE)
        .context("failed to lay out canvas")?;
    let scene = Scene::from_views(
        layout,
        Palette::default(),
        automaton.cells_view(),
        automaton.agent_view(),
    );
    let presentation = Presentation::new("antlife", settings.frame_interval, scene);

    let mut remaining = settings.ticks;
    backend.run(presentation, |_, scene| {
        if remaining == 0 {
            return FrameControl::Exit;
        }
        remaining -= 1;
        automaton.tick();
        scene.refresh(automaton.cells_view(), automaton.agent_view());
        FrameControl::Continue
    })?;

    info!(
        generation = world::query::generation(&automaton),
        population = world::query::population(&automaton),
        "finished antlife"
    );
    Ok(())
}
