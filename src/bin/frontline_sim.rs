//! Headless session runner
//!
//! Registers bots, runs a fixed number of ticks and writes the simulation
//! output as JSON. With `--verify-replay` the intent log is replayed against
//! a fresh world and the final snapshots are compared.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use frontline::bots::BotDriver;
use frontline::core::error::{EngineError, Result};
use frontline::core::types::PlayerInfo;
use frontline::core::Config;
use frontline::scheduler::{replay, SimulationOutput, TickScheduler};
use frontline::world::GameMap;

#[derive(Parser, Debug)]
#[command(name = "frontline_sim")]
#[command(about = "Run a bot-only conquest session and report the outcome")]
struct Args {
    /// Text map ('.' land, '~' water); a plain land grid is used when absent
    #[arg(long)]
    map: Option<PathBuf>,

    /// Grid width when no map file is given
    #[arg(long, default_value_t = 48)]
    width: u32,

    /// Grid height when no map file is given
    #[arg(long, default_value_t = 32)]
    height: u32,

    /// TOML config with [session] and [player] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Override the configured bot count
    #[arg(long)]
    bots: Option<u16>,

    /// Override the configured bot seed
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the JSON output
    #[arg(long, default_value = "frontline_output.json")]
    output: PathBuf,

    /// Replay the recorded intents and check the result matches
    #[arg(long)]
    verify_replay: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontline=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bots) = args.bots {
        config.session.num_bots = bots;
    }
    if let Some(seed) = args.seed {
        config.session.seed = seed;
    }

    let map = Arc::new(match &args.map {
        Some(path) => GameMap::load(path)?,
        None => GameMap::land(args.width, args.height),
    });

    println!("Frontline session");
    println!("=================");
    println!("Map: {}x{} tiles", map.width(), map.height());
    println!(
        "Bots: {}, seed {}, {} ticks",
        config.num_bots(),
        config.session.seed,
        args.ticks
    );
    println!();

    let mut scheduler = TickScheduler::with_shared_map(Arc::clone(&map), config.clone())?;
    let mut driver = BotDriver::new(config.session.seed);
    for i in 0..config.num_bots() {
        let id = scheduler.add_player(PlayerInfo::bot(format!("Bot {}", i + 1)));
        driver.register(id);
    }

    let start = Instant::now();
    for _ in 0..args.ticks {
        let intents = driver.plan(scheduler.world(), scheduler.attacks(), scheduler.config());
        for intent in intents {
            scheduler.submit(intent);
        }
        scheduler.step()?;
    }
    let output = SimulationOutput::new(&scheduler, start.elapsed());

    println!("{}", output.summary());
    std::fs::write(&args.output, output.to_json())?;
    println!("\nFull output written to {}", args.output.display());

    if args.verify_replay {
        let replayed = replay(map, config, scheduler.intent_log())?;
        if replayed.snapshot() != scheduler.snapshot() {
            return Err(EngineError::Config(
                "replay diverged from the recorded session".into(),
            ));
        }
        println!("Replay verified: {} ticks reproduced", replayed.tick());
    }

    Ok(())
}
