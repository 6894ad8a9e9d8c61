//! Simulator subcommands.
mod jobs;
mod run;

pub use jobs::Jobs;
pub use run::Run;
