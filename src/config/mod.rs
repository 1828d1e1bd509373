//! Changelog configuration resolution.
//!
//! A [`Configuration`] is assembled once per run from the `changelog` block
//! of `package.json` or `lerna.json` (first one found, never merged), then
//! completed by inferring the repository identifier and, when asked, the
//! next version, and finally by filling built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigurationError;
use crate::git::{self, DEFAULT_GIT_URL};

pub mod defaults;
pub mod manifest;

pub use defaults::{default_ignore_committers, default_labels};
pub use manifest::{Manifest, Manifests, RepositoryField, LERNA_MANIFEST, PACKAGE_MANIFEST};

/// User-supplied overrides, as found in a manifest's `changelog` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    /// Repository identifier (`owner/name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Label name to section heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<IndexMap<String, String>>,

    /// Logins whose commits are left out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_committers: Option<IndexSet<String>>,

    /// Response cache directory, relative to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Heading for unreleased changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_version: Option<String>,

    /// Derive `next_version` from the manifest `version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_version_from_metadata: Option<bool>,

    /// Web root of the hosting site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,

    /// API root of a self-hosted instance.
    #[serde(
        default,
        rename = "gitAPIUrl",
        alias = "gitApiUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub git_api_url: Option<String>,
}

/// The effective configuration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Repository identifier (`owner/name`), never empty.
    pub repo: String,
    /// Absolute repository root.
    pub root_path: PathBuf,
    /// Label name to section heading, never empty.
    pub labels: IndexMap<String, String>,
    /// Logins whose commits are left out.
    pub ignore_committers: IndexSet<String>,
    /// Response cache directory, relative to `root_path`.
    pub cache_dir: Option<PathBuf>,
    /// Heading for unreleased changes.
    pub next_version: Option<String>,
    /// Web root of the hosting site.
    pub git_url: Option<String>,
    /// API root of a self-hosted instance.
    #[serde(rename = "gitAPIUrl")]
    pub git_api_url: Option<String>,
}

/// Caller-side switches for [`resolve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Derive `next_version` from the manifest `version`.
    pub next_version_from_metadata: bool,
}

/// Fill-if-absent pipeline from a [`PartialConfig`] to a [`Configuration`].
pub struct ConfigBuilder<'a> {
    root_path: PathBuf,
    manifests: &'a Manifests,
    partial: PartialConfig,
}

impl<'a> ConfigBuilder<'a> {
    /// Starts from the first `changelog` block found, or an empty one.
    pub fn new(root_path: PathBuf, manifests: &'a Manifests) -> Self {
        let partial = manifests.changelog().cloned().unwrap_or_default();
        Self {
            root_path,
            manifests,
            partial,
        }
    }

    /// Infers `repo` from the declared repository URL unless one is configured.
    ///
    /// An empty `repo` counts as absent.
    pub fn fill_repo(&mut self) -> Result<&mut Self, ConfigurationError> {
        if self.partial.repo.as_deref().is_some_and(|r| !r.trim().is_empty()) {
            return Ok(self);
        }

        let git_url = non_empty(self.partial.git_url.as_deref()).unwrap_or(DEFAULT_GIT_URL);
        let repo = self
            .manifests
            .repository()
            .map(git::normalize_repository_url)
            .and_then(|url| git::repo_from_url(&url, git_url))
            .ok_or(ConfigurationError::MissingRepo)?;

        debug!(repo = %repo, "Inferred repository from package.json");
        self.partial.repo = Some(repo);
        Ok(self)
    }

    /// Replaces `next_version` with `v<version>` when inference is requested.
    pub fn fill_next_version(
        &mut self,
        options: ResolveOptions,
    ) -> Result<&mut Self, ConfigurationError> {
        let requested = options.next_version_from_metadata
            || self.partial.next_version_from_metadata.unwrap_or(false);
        if !requested {
            return Ok(self);
        }

        let version = self
            .manifests
            .version()
            .ok_or(ConfigurationError::MissingNextVersion)?;

        debug!(version = %version, "Inferred next version from manifest");
        self.partial.next_version = Some(format!("v{version}"));
        Ok(self)
    }

    /// Applies the built-in labels and ignored committers where none are set.
    pub fn fill_defaults(&mut self) -> &mut Self {
        if self.partial.labels.as_ref().map_or(true, |l| l.is_empty()) {
            self.partial.labels = Some(default_labels());
        }
        if self.partial.ignore_committers.is_none() {
            self.partial.ignore_committers = Some(default_ignore_committers());
        }
        self
    }

    /// Finalizes the configuration.
    pub fn build(self) -> Result<Configuration, ConfigurationError> {
        let PartialConfig {
            repo,
            labels,
            ignore_committers,
            cache_dir,
            next_version,
            next_version_from_metadata: _,
            git_url,
            git_api_url,
        } = self.partial;

        let repo = repo
            .filter(|r| !r.trim().is_empty())
            .ok_or(ConfigurationError::MissingRepo)?;

        Ok(Configuration {
            repo,
            root_path: self.root_path,
            labels: labels
                .filter(|l| !l.is_empty())
                .unwrap_or_else(default_labels),
            ignore_committers: ignore_committers.unwrap_or_else(default_ignore_committers),
            cache_dir,
            next_version,
            git_url,
            git_api_url,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolves the configuration of the project rooted at `root_path`.
///
/// Fails with [`ConfigurationError`] when the repository (or a requested
/// next version) cannot be determined. Unreadable or malformed manifests
/// propagate as-is.
pub fn resolve<P: AsRef<Path>>(root_path: P, options: ResolveOptions) -> Result<Configuration> {
    let root_path = root_path.as_ref();
    let manifests = Manifests::load(root_path)?;

    let mut builder = ConfigBuilder::new(root_path.to_path_buf(), &manifests);
    builder
        .fill_repo()?
        .fill_next_version(options)?
        .fill_defaults();
    let config = builder.build()?;

    info!(
        repo = %config.repo,
        root = %config.root_path.display(),
        next_version = ?config.next_version,
        "Resolved changelog configuration"
    );
    Ok(config)
}

/// Resolves the configuration of the repository containing the current directory.
pub fn load(options: ResolveOptions) -> Result<Configuration> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let root_path = git::find_root(&cwd)?;
    resolve(root_path, options)
}
