//! Git repository discovery and remote URL handling.

pub mod remote;
pub mod repository;

pub use remote::{normalize_repository_url, repo_from_url, DEFAULT_GIT_URL};
pub use repository::find_root;
