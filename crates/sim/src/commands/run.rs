//! Replay a scenario file and print every substitution.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use combo_jobs::{RolesLoader, world_rules};
use combo_runtime::{RuntimeConfig, TickOutcome};
use combo_sim::{Scenario, logging, replay};

/// Replay a scenario file
#[derive(Parser)]
pub struct Run {
    /// Scenario RON file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Log filter (overrides RUST_LOG), e.g. `combo=debug`
    #[arg(short, long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Role table RON file (defaults to the bundled table)
    #[arg(long, value_name = "PATH")]
    roles: Option<PathBuf>,

    /// Print skipped frames as well
    #[arg(short, long)]
    verbose: bool,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let _guard = logging::init(self.log_level.as_deref(), self.log_file.as_deref())?;

        let scenario = Scenario::load(&self.file)?;
        let rules = match &self.roles {
            Some(path) => RolesLoader::load(path)?,
            None => world_rules(),
        };
        let config = RuntimeConfig::from_env();
        tracing::debug!(target: "combo::sim", ?config, "runtime config");

        let report = replay(&scenario, config, Arc::new(rules));

        println!("scenario: {}", report.name);
        for frame in &report.frames {
            match frame.outcome {
                TickOutcome::Skipped(reason) if self.verbose => println!(
                    "frame {:>3} at {:>7}ms skipped ({reason})",
                    frame.index,
                    frame.at.as_millis()
                ),
                _ => {}
            }
            for press in &frame.presses {
                println!("{press}");
            }
        }

        let diagnostics = &report.diagnostics;
        println!(
            "final: tick {} | profile {:?} | last anchor {:?} | opener {:?}",
            diagnostics.snapshot.tick,
            diagnostics.profile_key,
            diagnostics.resolver.last_anchor,
            diagnostics.resolver.opener_progress,
        );

        let mismatches = report.mismatches().count();
        if mismatches > 0 {
            bail!("{mismatches} press(es) did not match their expected action");
        }
        Ok(())
    }
}
