//! Project manifest reading (`package.json`, `lerna.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::PartialConfig;

/// Primary manifest; wins over [`LERNA_MANIFEST`] wherever both apply.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Secondary manifest.
pub const LERNA_MANIFEST: &str = "lerna.json";

/// The parts of a manifest the resolver looks at. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// The `changelog` configuration block.
    #[serde(default)]
    pub changelog: Option<PartialConfig>,

    /// Declared package version.
    #[serde(default)]
    pub version: Option<String>,

    /// Declared source repository.
    #[serde(default)]
    pub repository: Option<RepositoryField>,
}

/// `repository` is either a bare string or an object carrying a `url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    /// `"repository": "git+https://github.com/owner/name.git"`
    Url(String),
    /// `"repository": { "type": "git", "url": "..." }`
    Object {
        /// Repository URL, when present.
        #[serde(default)]
        url: Option<String>,
    },
}

impl RepositoryField {
    /// Returns the declared URL or shorthand, if any.
    pub fn reference(&self) -> Option<&str> {
        let reference = match self {
            RepositoryField::Url(url) => Some(url.as_str()),
            RepositoryField::Object { url } => url.as_deref(),
        };
        reference.filter(|r| !r.trim().is_empty())
    }
}

impl Manifest {
    /// Reads a manifest, returning `None` when the file does not exist.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = serde_json::from_str::<Manifest>(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        debug!(
            path = %path.display(),
            has_changelog = manifest.changelog.is_some(),
            "Read manifest"
        );
        Ok(Some(manifest))
    }

    fn declared_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Both candidate manifests of a project root, read once.
#[derive(Debug, Clone, Default)]
pub struct Manifests {
    /// Contents of `package.json`, if present.
    pub package: Option<Manifest>,
    /// Contents of `lerna.json`, if present.
    pub lerna: Option<Manifest>,
}

impl Manifests {
    /// Reads both manifests from `root_path`.
    pub fn load<P: AsRef<Path>>(root_path: P) -> Result<Self> {
        let root_path = root_path.as_ref();
        Ok(Self {
            package: Manifest::read(root_path.join(PACKAGE_MANIFEST))?,
            lerna: Manifest::read(root_path.join(LERNA_MANIFEST))?,
        })
    }

    fn in_order(&self) -> impl Iterator<Item = &Manifest> {
        self.package.iter().chain(self.lerna.iter())
    }

    /// The first `changelog` block found, in manifest order. Never merged.
    pub fn changelog(&self) -> Option<&PartialConfig> {
        self.in_order().find_map(|m| m.changelog.as_ref())
    }

    /// The first declared version, in manifest order.
    pub fn version(&self) -> Option<&str> {
        self.in_order().find_map(Manifest::declared_version)
    }

    /// The repository reference declared in `package.json`.
    pub fn repository(&self) -> Option<&str> {
        self.package
            .as_ref()
            .and_then(|m| m.repository.as_ref())
            .and_then(RepositoryField::reference)
    }
}
