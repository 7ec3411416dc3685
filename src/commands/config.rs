//! Config command - show or initialize the settings file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lsbhide::Settings;

use super::CommandExecutor;

/// Show the effective settings, or write a default settings file.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Write the default settings to the settings file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing settings file with --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Settings file to use instead of ~/.lsbhide/config.toml
    #[arg(skip)]
    pub path: Option<PathBuf>,
}

impl CommandExecutor for ConfigCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Settings::config_path()?,
        };

        if self.init {
            if path.exists() && !self.force {
                bail!(
                    "{} already exists. Use --force to overwrite",
                    path.display()
                );
            }
            Settings::default()
                .save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote default settings to {}", path.display());
            return Ok(());
        }

        eprintln!("# {}", path.display());
        print!("{}", settings.to_toml()?);
        Ok(())
    }
}
