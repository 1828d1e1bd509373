//! Hosting API CLI commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::future::try_join_all;
use tracing::debug;

use super::ResolveArgs;
use crate::github::{ClientOptions, MetadataClient};
use crate::utils::Settings;

/// Hosting API operations.
#[derive(Parser)]
pub struct GithubCommand {
    /// Hosting API subcommand to execute.
    #[command(subcommand)]
    pub command: GithubSubcommands,
}

/// Hosting API subcommands.
#[derive(Subcommand)]
pub enum GithubSubcommands {
    /// Fetches issues or pull requests and prints them as JSON.
    Issue(IssueCommand),
    /// Fetches user profiles and prints them as JSON.
    User(UserCommand),
    /// Prints the web URL prefix for issues of the repository.
    IssueUrl(IssueUrlCommand),
}

/// Issue command options.
#[derive(Parser)]
pub struct IssueCommand {
    /// Resolution options.
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Repository (`owner/name`); defaults to the configured one.
    #[arg(long)]
    pub repo: Option<String>,

    /// Issue numbers to fetch.
    #[arg(required = true)]
    pub numbers: Vec<u64>,
}

/// User command options.
#[derive(Parser)]
pub struct UserCommand {
    /// Resolution options.
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Logins to fetch.
    #[arg(required = true)]
    pub logins: Vec<String>,
}

/// Issue URL command options.
#[derive(Parser)]
pub struct IssueUrlCommand {
    /// Resolution options.
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Repository (`owner/name`); defaults to the configured one.
    #[arg(long)]
    pub repo: Option<String>,
}

impl GithubCommand {
    /// Executes the github command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            GithubSubcommands::Issue(cmd) => cmd.execute().await,
            GithubSubcommands::User(cmd) => cmd.execute().await,
            GithubSubcommands::IssueUrl(cmd) => cmd.execute(),
        }
    }
}

fn client_for(resolve: &ResolveArgs) -> Result<MetadataClient> {
    let config = resolve.resolve()?;
    let settings = Settings::load()?;
    MetadataClient::new(&ClientOptions::from(&config), &settings)
}

impl IssueCommand {
    /// Executes the issue command.
    pub async fn execute(self) -> Result<()> {
        let client = client_for(&self.resolve)?;
        let repo = self.repo.as_deref().unwrap_or(client.repo());
        debug!(repo = %repo, count = self.numbers.len(), "Fetching issues");

        let issues = try_join_all(
            self.numbers
                .iter()
                .map(|&number| client.get_issue(repo, number)),
        )
        .await?;

        println!("{}", serde_json::to_string_pretty(&issues)?);
        Ok(())
    }
}

impl UserCommand {
    /// Executes the user command.
    pub async fn execute(self) -> Result<()> {
        let client = client_for(&self.resolve)?;
        let users = try_join_all(self.logins.iter().map(|login| client.get_user(login))).await?;

        println!("{}", serde_json::to_string_pretty(&users)?);
        Ok(())
    }
}

impl IssueUrlCommand {
    /// Executes the issue-url command.
    pub fn execute(self) -> Result<()> {
        let client = client_for(&self.resolve)?;
        let repo = self.repo.as_deref().unwrap_or(client.repo());
        println!("{}", client.issue_url(repo));
        Ok(())
    }
}
