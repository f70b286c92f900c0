//! kubesim — presenter driver for the Kubernetes concept demos.
//!
//! Stands in for the slide deck's interactive widgets: scripted
//! scenarios push load, bound and mode changes into the simulated
//! cluster and pod autoscalers and print what a gauge would show.
//!
//! # Usage
//!
//! ```text
//! kubesim defaults > kubesim.toml
//! kubesim replay demos/scenarios/cluster-cooldown.toml --config kubesim.toml
//! kubesim access editor secrets list
//! kubesim kitchen sous-chef
//! ```

mod replay;
mod scenario;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use kubesim_core::SimConfig;
use kubesim_rbac::{AccessMatrix, KitchenBoard, KitchenRole, Role, Verb};

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "kubesim", about = "Kubernetes concept simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the compiled-in simulation defaults as TOML.
    Defaults,

    /// Replay a scenario file against the cluster and pod autoscalers.
    Replay {
        /// Scenario TOML with `[[step]]` entries.
        scenario: PathBuf,

        /// Override simulation defaults from this file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit one JSON object per frame instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Check a role's access to a resource in the RBAC demo table.
    Access {
        role: String,
        resource: String,
        verb: String,
    },

    /// Show which kitchen stations a role may use.
    Kitchen {
        /// head-chef, sous-chef, line-cook or none.
        #[arg(default_value = "none")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,kubesim=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Defaults => {
            print!("{}", SimConfig::default().to_toml_string()?);
            Ok(())
        }
        Command::Replay {
            scenario,
            config,
            json,
        } => run_replay(scenario, config, json).await,
        Command::Access {
            role,
            resource,
            verb,
        } => {
            let role: Role = role.parse()?;
            let verb: Verb = verb.parse()?;
            let resource = resource.trim().to_ascii_lowercase();
            let decision = AccessMatrix::cluster_defaults().check(role, &resource, verb);
            println!(
                "{role} {verb} {resource}: {}",
                if decision.is_allowed() { "allowed" } else { "denied" }
            );
            Ok(())
        }
        Command::Kitchen { role } => {
            let mut board = KitchenBoard::new();
            board.assign(role.parse::<KitchenRole>()?);
            println!("Current role: {}", board.role().label());
            for (station, decision) in board.board() {
                println!(
                    "  {:<20} {}",
                    station.label(),
                    if decision.is_allowed() { "access granted" } else { "access denied" }
                );
            }
            Ok(())
        }
    }
}

async fn run_replay(
    scenario_path: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    let actions = Scenario::from_file(&scenario_path)?.actions()?;
    info!(
        scenario = %scenario_path.display(),
        steps = actions.len(),
        "replaying scenario"
    );

    for frame in replay::replay(&config, &actions).await? {
        if json {
            println!("{}", serde_json::to_string(&frame)?);
        } else {
            println!("[{:>3}] {}", frame.step, replay::render(&frame.snapshot));
        }
    }
    Ok(())
}
