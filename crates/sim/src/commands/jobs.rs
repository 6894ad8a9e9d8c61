//! List bundled job profiles.
use anyhow::Result;
use clap::Parser;
use combo_jobs::JobCatalog;

/// List bundled job profiles at a level
#[derive(Parser)]
pub struct Jobs {
    /// Player level to build each profile at
    #[arg(short, long, default_value_t = 100)]
    level: u8,
}

impl Jobs {
    pub fn execute(self) -> Result<()> {
        let catalog = JobCatalog::new();
        for entry in catalog.iter() {
            let profile = entry.profile(self.level)?;
            println!("{} ({}) at level {}", entry.name, entry.job, self.level);
            println!("  profile:   {}", profile.name());
            println!("  rules:     {}", profile.rules().len());
            let anchors: Vec<String> = profile.anchors().iter().map(ToString::to_string).collect();
            println!("  anchors:   {}", anchors.join(", "));
            println!("  cooldowns: {}", profile.cooldowns().len());
            match profile.opener() {
                Some(opener) => println!("  opener:    {} ({} steps)", opener.name(), opener.len()),
                None => println!("  opener:    none"),
            }
        }
        Ok(())
    }
}
