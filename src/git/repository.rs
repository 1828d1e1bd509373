//! Git repository discovery

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository;
use tracing::debug;

/// Returns the work-tree root of the repository containing `start`.
///
/// Walks up from `start` the way `git rev-parse --show-toplevel` does.
/// Bare repositories have no work tree and are rejected.
pub fn find_root<P: AsRef<Path>>(start: P) -> Result<PathBuf> {
    let start = start.as_ref();
    let repo = Repository::discover(start)
        .with_context(|| format!("Not in a git repository: {}", start.display()))?;

    let workdir = repo
        .workdir()
        .with_context(|| format!("Repository has no work tree: {}", repo.path().display()))?;

    let root = workdir
        .canonicalize()
        .with_context(|| format!("Failed to resolve repository root: {}", workdir.display()))?;

    debug!(root = %root.display(), "Located repository root");
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_root_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let nested = temp_dir.path().join("packages").join("core");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_root(&nested).unwrap();
        assert_eq!(root, temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn rejects_bare_repository() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init_bare(temp_dir.path()).unwrap();

        let err = find_root(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("no work tree"));
    }
}
