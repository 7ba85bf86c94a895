use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use synergy_grid_core::{
    config::{EnvConfig, ScoringPolicy},
    environment::SynergyGridEnv,
    policy::{GreedyPolicy, Policy, RandomPolicy},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Run SynergyGrid episodes with a baseline policy", long_about = None)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Number of episodes to run
    #[arg(short, long, default_value_t = 1)]
    episodes: u32,

    /// Seed of the first episode; episode `i` uses `seed + i`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Action source
    #[arg(short, long, value_enum, default_value_t = PolicyKind::Random)]
    policy: PolicyKind,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(long)]
    max_steps: Option<u32>,

    #[arg(long)]
    max_active: Option<usize>,

    /// Highest tier resource; 0 disables tiers
    #[arg(long)]
    max_tier: Option<u32>,

    /// Pay tier rewards only when a chain breaks
    #[arg(long)]
    combo: bool,

    /// Print the grid after every step
    #[arg(long)]
    show: bool,

    /// Emit one JSON summary per episode instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    Random,
    Greedy,
}

/// Per-episode results printed at the end of each run.
#[derive(Debug, Serialize)]
struct EpisodeSummary {
    episode: u32,
    seed: Option<u64>,
    policy: &'static str,
    steps: u32,
    total_reward: i64,
    final_score: i64,
    longest_chain: usize,
    terminated: bool,
    truncated: bool,
}

struct App {
    /// The core simulation environment.
    env: SynergyGridEnv,
    /// Where actions come from.
    policy: Box<dyn Policy>,
    /// Print the grid after every step.
    show: bool,
}

impl App {
    fn new(config: EnvConfig, policy: Box<dyn Policy>, show: bool) -> Result<Self> {
        let env = SynergyGridEnv::new(config).context("Failed to build environment")?;
        Ok(App { env, policy, show })
    }

    /// Plays one episode to termination or truncation.
    fn run_episode(&mut self, episode: u32, seed: Option<u64>) -> Result<EpisodeSummary> {
        self.env.reset(seed)?;
        if self.show {
            println!("{}", self.env.world());
        }

        let mut total_reward = 0;
        let mut longest_chain = 0;
        loop {
            let action = self.policy.select_action(self.env.world());
            let step = self.env.step(action)?;
            total_reward += step.reward;
            longest_chain = longest_chain.max(self.env.world().chain().len());

            if self.show {
                println!("Action: {action:?}  Reward: {}", step.reward);
                println!("{}", self.env.world());
            }

            if step.is_done() {
                debug!(episode, "Episode done");
                return Ok(EpisodeSummary {
                    episode,
                    seed,
                    policy: self.policy.name(),
                    steps: self.env.step_count(),
                    total_reward,
                    final_score: self.env.world().agent().score(),
                    longest_chain,
                    terminated: step.terminated,
                    truncated: step.truncated,
                });
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(
        rows = config.world.grid_rows,
        cols = config.world.grid_cols,
        max_steps = config.max_steps,
        max_tier = config.world.max_tier,
        policy = ?args.policy,
        "Configuration loaded"
    );

    let policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Random => Box::new(RandomPolicy::new(args.seed.unwrap_or_default())),
        PolicyKind::Greedy => Box::new(GreedyPolicy::new()),
    };
    let mut app = App::new(config, policy, args.show)?;

    for episode in 0..args.episodes {
        let seed = args.seed.map(|seed| seed.wrapping_add(u64::from(episode)));
        let summary = app.run_episode(episode, seed)?;
        if args.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!(
                "episode {:>3}  steps {:>4}  reward {:>5}  score {:>5}  chain {:>2}  {}",
                summary.episode,
                summary.steps,
                summary.total_reward,
                summary.final_score,
                summary.longest_chain,
                if summary.terminated {
                    "depleted"
                } else {
                    "out of steps"
                }
            );
        }
    }
    Ok(())
}

/// Loads the config file if one was given, then applies flag overrides.
fn build_config(args: &Args) -> Result<EnvConfig> {
    let mut config = match &args.config {
        Some(path) => EnvConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EnvConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.world.grid_rows = rows;
    }
    if let Some(cols) = args.cols {
        config.world.grid_cols = cols;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(max_active) = args.max_active {
        config.world.max_active_resources = max_active;
    }
    if let Some(max_tier) = args.max_tier {
        config.world.max_tier = max_tier;
    }
    if args.combo {
        config.world.rewards.scoring = ScoringPolicy::Combo;
    }

    config.validate()?;
    Ok(config)
}
