//! CLI interface for changelog-kit.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{Configuration, ResolveOptions};

pub mod config;
pub mod github;

/// changelog-kit: changelog configuration and hosting metadata.
#[derive(Parser)]
#[command(name = "changelog-kit")]
#[command(about = "Changelog configuration and hosting metadata", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Configuration resolution.
    Config(config::ConfigCommand),
    /// Hosting API metadata.
    Github(github::GithubCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config(config_cmd) => config_cmd.execute(),
            Commands::Github(github_cmd) => github_cmd.execute().await,
        }
    }
}

/// Options shared by every command that needs a resolved configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Repository root; discovered from the current directory when omitted.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Derive the next version from the manifest `version` field.
    #[arg(long)]
    pub next_version_from_metadata: bool,
}

impl ResolveArgs {
    /// Resolves the configuration these arguments describe.
    pub fn resolve(&self) -> Result<Configuration> {
        let options = ResolveOptions {
            next_version_from_metadata: self.next_version_from_metadata,
        };
        match &self.root {
            Some(root) => crate::config::resolve(root, options),
            None => crate::config::load(options),
        }
    }
}
