//! # changelog-kit
//!
//! Configuration resolution and cached hosting-API access for changelog
//! generation.
//!
//! ## Features
//!
//! - Resolves the effective changelog configuration from `package.json` or
//!   `lerna.json`, inferring the repository and next version when needed
//! - Fetches issue, pull request and user metadata with an on-disk
//!   response cache, for both the public service and self-hosted instances
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use changelog_kit::config::{self, ResolveOptions};
//! use changelog_kit::github::{ClientOptions, MetadataClient};
//! use changelog_kit::utils::Settings;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = config::load(ResolveOptions::default())?;
//! let client = MetadataClient::new(&ClientOptions::from(&config), &Settings::load()?)?;
//! let issue = client.get_issue(&config.repo, 1).await?;
//! println!("{}", issue.title);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::config::{resolve, Configuration, PartialConfig, ResolveOptions};
pub use crate::error::ConfigurationError;
pub use crate::github::MetadataClient;

/// The current version of changelog-kit.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
