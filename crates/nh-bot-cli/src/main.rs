//! Heuristic NetHack bot
//!
//! Plays one episode against the simulated dungeon and prints what it
//! achieved.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nh_bot::{Agent, AgentConfig, EpisodeSummary, Environment, StepLimit};
use nh_sim::Simulator;

/// Heuristic NetHack bot
#[derive(Parser, Debug)]
#[command(name = "nh-bot")]
#[command(author, version, about = "Let the bot explore the dungeon", long_about = None)]
struct Args {
    /// RNG seed for the dungeon and the agent (overrides NH_BOT_SEED)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Stop the episode after this many actions
    #[arg(short = 'n', long = "max-steps", default_value_t = 5000)]
    max_steps: u64,

    /// Level file, levels separated by lines of `===`
    #[arg(short = 'm', long = "map")]
    map: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long = "json")]
    json: bool,

    /// Enumerate neighbours in fixed order
    #[arg(long = "no-shuffle")]
    no_shuffle: bool,
}

impl Args {
    /// Layer the command line over `base`
    fn config(&self, base: AgentConfig) -> AgentConfig {
        let mut config = base;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_shuffle {
            config.shuffle_neighbors = false;
        }
        config
    }

    fn simulator(&self, seed: u64) -> Result<Simulator> {
        let sim = match &self.map {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading map file {}", path.display()))?;
                Simulator::from_text(&text, seed)
                    .with_context(|| format!("parsing map file {}", path.display()))?
            }
            None => Simulator::builtin(seed)?,
        };
        Ok(sim)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    let config = args.config(AgentConfig::from_env());
    let env = StepLimit::new(args.simulator(config.seed)?, args.max_steps);
    tracing::info!(seed = config.seed, max_steps = args.max_steps, "starting episode");

    let mut agent = Agent::new(env, config).context("starting the episode")?;
    let summary = agent.run().context("running the episode")?;
    report(&summary, agent.env(), args.json)
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report<E: Environment>(summary: &EpisodeSummary, env: &StepLimit<E>, json: bool) -> Result<()> {
    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary.summary());
        let levels: Vec<String> = env.levels().iter().map(ToString::to_string).collect();
        println!(
            "Steps: {}, last turn: {}, levels entered: {}",
            env.steps(),
            env.last_turn(),
            levels.join(" ")
        );
        if let Some(reason) = &summary.end_reason {
            println!("Ended: {reason}");
        }
        for mismatch in &summary.panics {
            println!("  panic: {mismatch}");
        }
    }
    Ok(())
}
