//! Scenario simulator for the combo engine.
//!
//! Run with: `cargo run -p combo-sim -- run crates/sim/scenarios/sge_dot_refresh.ron`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Jobs, Run};

/// Scenario simulator for the combo engine
#[derive(Parser)]
#[command(name = "combo-sim")]
#[command(about = "Replay action-substitution scenarios", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Replay a scenario file and check its expectations
    Run(Run),

    /// List bundled job profiles
    Jobs(Jobs),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for COMBO_* settings and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Jobs(cmd) => cmd.execute(),
    }
}
