#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts the Floodgate puzzle headlessly.

mod frame;
mod script;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use floodgate_core::{Event, TICK_INTERVAL};
use floodgate_world::{query, Catalog};
use log::info;

use self::{script::ScriptedInput, session::Session};

#[derive(Debug, Parser)]
#[command(
    name = "floodgate",
    about = "Water-flow gate puzzle played from the terminal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the levels of a catalog.
    Levels(CatalogArgs),
    /// Validate a TOML level file and report path diagnostics.
    Check {
        /// Level file to validate.
        file: PathBuf,
    },
    /// Print a catalog in the TOML level file format.
    Export(CatalogArgs),
    /// Play a scripted session and print what happens.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// TOML level file to use instead of the built-in levels.
    #[arg(long, value_name = "FILE")]
    levels: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PlayArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Zero based level to start on.
    #[arg(long, default_value_t = 0)]
    level: usize,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 60)]
    ticks: u64,
    /// Touch a cell right before tick TICK (counted from 1), as X,Y@TICK.
    /// TICK 0 touches right after the level loads. May be repeated.
    #[arg(long = "touch", value_name = "X,Y@TICK")]
    touches: Vec<ScriptedInput>,
    /// Hover a cell right before tick TICK, as X,Y@TICK. May be repeated.
    #[arg(long = "hover", value_name = "X,Y@TICK")]
    hovers: Vec<ScriptedInput>,
    /// Print the grid after every tick instead of only at the end.
    #[arg(long)]
    frames: bool,
    /// Sleep the real tick interval between ticks.
    #[arg(long)]
    realtime: bool,
}

/// Entry point for the Floodgate command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Levels(args) => list_levels(&args),
        Commands::Check { file } => check_levels(&file),
        Commands::Export(args) => export_levels(&args),
        Commands::Play(args) => play(&args),
    }
}

fn load_catalog(args: &CatalogArgs) -> Result<Catalog> {
    let Some(path) = &args.levels else {
        return Ok(Catalog::builtin());
    };
    read_catalog(path)
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    let catalog = Catalog::from_toml(&contents)
        .with_context(|| format!("invalid level file {}", path.display()))?;
    info!("loaded {} levels from {}", catalog.len(), path.display());
    Ok(catalog)
}

fn list_levels(args: &CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args)?;
    for (index, level) in catalog.iter().enumerate() {
        println!(
            "{index}: {} ({}x{}, {} gates, {} steps) \"{}\"",
            level.name().unwrap_or("unnamed"),
            level.width(),
            level.height(),
            level.gates().len(),
            level.water_path().step_count(),
            level.status_text(),
        );
    }
    Ok(())
}

fn check_levels(path: &Path) -> Result<()> {
    let catalog = read_catalog(path)?;
    let mut diagnostics = 0usize;
    for (index, level) in catalog.iter().enumerate() {
        for (position, symbol) in level.water_path().invalid_tokens() {
            println!("level {index}: token {symbol:?} at {position} will be skipped");
            diagnostics += 1;
        }
    }
    println!(
        "{}: {} levels ok, {diagnostics} diagnostics",
        path.display(),
        catalog.len()
    );
    Ok(())
}

fn export_levels(args: &CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args)?;
    let rendered = catalog
        .to_toml()
        .context("failed to render the level catalog")?;
    print!("{rendered}");
    Ok(())
}

fn play(args: &PlayArgs) -> Result<()> {
    let mut session = Session::new(load_catalog(&args.catalog)?);
    let available = query::level_count(session.world());
    if args.level >= available {
        bail!(
            "level {} does not exist, the catalog holds {available} levels",
            args.level,
        );
    }

    println!("{}", session.banner());
    report(0, &session.start(args.level));
    apply_scripted(&mut session, args, 0);

    for tick in 1..=args.ticks {
        apply_scripted(&mut session, args, tick);
        report(tick, &session.tick());

        if args.frames {
            print!("{}", frame::render(session.world()));
        }
        if args.realtime {
            thread::sleep(TICK_INTERVAL);
        }
    }

    if !args.frames {
        print!("{}", frame::render(session.world()));
    }
    println!(
        "level {} cursor {} after {} ticks: {}",
        query::level_index(session.world()),
        query::cursor(session.world()).cell,
        query::tick_index(session.world()),
        query::status_text(session.world()),
    );
    Ok(())
}

/// Applies the hovers and touches scheduled before `tick`; tick 0 is right
/// after the level loads.
fn apply_scripted(session: &mut Session, args: &PlayArgs, tick: u64) {
    for cell in ScriptedInput::due(&args.hovers, tick) {
        report(tick, &session.hover(cell));
    }
    for cell in ScriptedInput::due(&args.touches, tick) {
        report(tick, &session.touch(cell));
    }
}

fn report(tick: u64, events: &[Event]) {
    for event in events {
        match event {
            Event::LevelLoaded { index } => println!("[{tick}] level {index} loaded"),
            Event::GateOpened { gate, cell } => {
                println!("[{tick}] gate {} opened at {cell}", gate.get());
            }
            Event::LevelCompleted { index, .. } => println!("[{tick}] level {index} complete"),
            Event::StatusChanged { text } => println!("[{tick}] status: {text}"),
            Event::SoundPlayed { cue } => {
                println!("[{tick}] sound: {} ({:.1})", cue.name(), cue.volume());
            }
            Event::TimeAdvanced { .. }
            | Event::CellFlooded { .. }
            | Event::CellSpilled { .. }
            | Event::CursorMoved { .. } => {}
        }
    }
}
