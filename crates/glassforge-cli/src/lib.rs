//! # GlassForge CLI
//!
//! Command-line interface for GlassForge level packs.
//!
//! ## Commands
//! - `run` - Run a pack headless and print the final frame
//! - `inspect` - Summarize a pack's manifest
//! - `collision` - Dump the collision map of one level

use std::fmt::Write as _;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glassforge_assets::{GameManifest, LevelPack};
use glassforge_engine::{Engine, LevelRequest};
use glassforge_platform::{FixedRateTimer, HeadlessHost, Pipeline};

/// Ticks allowed for a level image to arrive before giving up
const LOAD_TICKS: u64 = 8;

/// Brightness ramp for ASCII frames, darkest first
const RAMP: &[u8] = b" .:-=+*#%@";

/// GlassForge CLI
#[derive(Parser)]
#[command(name = "glassforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Level pack directory (holds game.json)
    #[arg(short, long, default_value = ".")]
    pub pack: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the pack headless and print the last frame
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,

        /// Start at this level instead of the first
        #[arg(short, long)]
        level: Option<usize>,

        /// Print the frame with ANSI colors instead of ASCII
        #[arg(long)]
        color: bool,

        /// Pace ticks at the configured rate instead of running flat out
        #[arg(long)]
        realtime: bool,
    },

    /// Print a summary of the pack's manifest
    Inspect {
        /// Print the full manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the collision map of a level after loading it
    Collision {
        /// Level index
        #[arg(default_value = "0")]
        level: usize,
    },
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let pack = LevelPack::open(&cli.pack)
        .with_context(|| format!("failed to open level pack {}", cli.pack.display()))?;

    match cli.command {
        Commands::Run { ticks, level, color, realtime } => {
            let engine = run(&pack, ticks, level, realtime)?;
            log::info!("Ran {} ticks, level {:?}", engine.ticks(), engine.cursor().loaded());
            let frame = if color {
                render_ansi(engine.host())
            } else {
                render_ascii(engine.host())
            };
            print!("{}", frame);
        }

        Commands::Inspect { json } => {
            if json {
                let text = serde_json::to_string_pretty(pack.manifest()).context("failed to encode manifest")?;
                println!("{}", text);
            } else {
                print!("{}", summary(pack.manifest()));
            }
        }

        Commands::Collision { level } => {
            let engine = load_level(&pack, level)?;
            print!("{}", collision_map(&engine));
        }
    }

    Ok(())
}

/// Create an engine for a pack against a headless host
pub fn open_engine(pack: &LevelPack) -> Result<Engine<HeadlessHost>> {
    let config = pack.manifest().engine_config();
    let host = HeadlessHost::new(config.screen_width, config.screen_height);
    Engine::new(pack.manifest().clone(), host).context("invalid game manifest")
}

/// Answer every image request the engine made since the last call
///
/// Returns how many completions the engine turned down as stale.
pub fn resolve_requests(engine: &mut Engine<HeadlessHost>, pack: &LevelPack) -> Result<usize> {
    let mut rejected = 0;
    for request in engine.host_mut().take_all_requests() {
        let image = pack
            .load_image(&request.path)
            .with_context(|| format!("failed to load {}", request.path))?;
        let accepted = match request.pipeline {
            Pipeline::Sprites => engine.on_sprite_loaded(&request.name, image),
            Pipeline::Terrain => engine.on_terrain_loaded(request.ticket, image),
        };
        if !accepted {
            log::warn!("{:?} load of {} ({}) was rejected", request.pipeline, request.path, request.ticket);
            rejected += 1;
        }
    }
    Ok(rejected)
}

/// Run a pack for a number of ticks, resolving loads after every tick
///
/// With `realtime` the ticks are paced by a [`FixedRateTimer`] at the
/// configured rate.
pub fn run(pack: &LevelPack, ticks: u64, level: Option<usize>, realtime: bool) -> Result<Engine<HeadlessHost>> {
    let mut engine = open_engine(pack)?;
    let mut timer = if realtime {
        Some(FixedRateTimer::new(engine.config().ticks_per_second).context("invalid tick rate")?)
    } else {
        None
    };

    engine.init();
    if let Some(level) = level {
        engine.request_level(LevelRequest::Absolute(level));
    }
    resolve_requests(&mut engine, pack)?;

    let mut remaining = ticks;
    while remaining > 0 {
        let due = match timer.as_mut() {
            Some(timer) => {
                thread::sleep(timer.until_next());
                u64::from(timer.poll())
            }
            None => remaining,
        };
        for _ in 0..due.min(remaining) {
            engine.tick();
            resolve_requests(&mut engine, pack)?;
            remaining -= 1;
        }
    }
    Ok(engine)
}

/// Tick until a level has been ingested
pub fn load_level(pack: &LevelPack, level: usize) -> Result<Engine<HeadlessHost>> {
    let count = pack.manifest().levels.len();
    if level >= count {
        bail!("level {} out of range, the pack has {} level(s)", level, count);
    }

    let mut engine = open_engine(pack)?;
    engine.init();
    engine.request_level(LevelRequest::Absolute(level));
    resolve_requests(&mut engine, pack)?;
    for _ in 0..LOAD_TICKS {
        engine.tick();
        resolve_requests(&mut engine, pack)?;
        if engine.cursor().loaded() == Some(level) {
            return Ok(engine);
        }
    }
    bail!("level {} did not load within {} ticks", level, LOAD_TICKS)
}

/// Last presented frame as ASCII art, one character per pixel
pub fn render_ascii(host: &HeadlessHost) -> String {
    let mut out = String::new();
    for row in host.frame().chunks(host.width() as usize) {
        for pixel in row {
            let luma = (pixel.r as u32 * 299 + pixel.g as u32 * 587 + pixel.b as u32 * 114) / 1000;
            let index = luma as usize * (RAMP.len() - 1) / 255;
            out.push(RAMP[index] as char);
        }
        out.push('\n');
    }
    out
}

/// Last presented frame as 24-bit ANSI background cells
pub fn render_ansi(host: &HeadlessHost) -> String {
    let mut out = String::new();
    for row in host.frame().chunks(host.width() as usize) {
        for pixel in row {
            let _ = write!(out, "\x1b[48;2;{};{};{}m  ", pixel.r, pixel.g, pixel.b);
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

/// Collision grid of the loaded level
///
/// `#` marks terrain, a digit the number of objects in a cell, `.` an
/// empty cell.
pub fn collision_map(engine: &Engine<HeadlessHost>) -> String {
    let grid = &engine.world().grid;
    let mut out = String::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let occupants = grid.occupants_at(x, y);
            let cell = if occupants.iter().any(|occupant| occupant.is_terrain()) {
                '#'
            } else if occupants.is_empty() {
                '.'
            } else {
                char::from_digit(occupants.len().min(9) as u32, 10).unwrap_or('+')
            };
            out.push(cell);
        }
        out.push('\n');
    }
    out
}

/// Human-readable manifest summary
pub fn summary(manifest: &GameManifest) -> String {
    let config = manifest.engine_config();
    let mut out = String::new();
    let _ = writeln!(out, "Screen: {}x{} at {} ticks/s", config.screen_width, config.screen_height, config.ticks_per_second);
    let _ = writeln!(out, "Sprites: {}", manifest.sprites.len());
    for (name, sprite) in &manifest.sprites {
        let _ = writeln!(out, "  {} -> {} ({} frame(s))", name, sprite.image, sprite.frames.unwrap_or(1));
    }
    let _ = writeln!(out, "Levels: {}", manifest.levels.len());
    for (index, level) in manifest.levels.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}: {} ({} object(s), {} status line(s))",
            index,
            level.image,
            level.objects.len(),
            level.status_text.len()
        );
    }
    let _ = writeln!(out, "Spawn groups: {}", manifest.spawn_table.len());
    for (token, group) in &manifest.spawn_table {
        let default = group.default.as_ref().map_or("-", |entry| entry.kind.as_str());
        let _ = writeln!(out, "  {}: default {}, {} variant(s)", token, default, group.variants.len());
    }
    out
}
