//! Configuration error handling.

use thiserror::Error;

/// User-correctable misconfiguration that makes a run impossible.
///
/// These are fatal: nothing retries or falls back once one is raised.
/// I/O, JSON and HTTP failures are not represented here and travel as
/// [`anyhow::Error`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No `repo` configured and none could be inferred from `package.json`.
    #[error(r#"Could not infer "repo" from the "package.json" file"#)]
    MissingRepo,

    /// `nextVersionFromMetadata` was requested but no manifest declares a version.
    #[error(r#"Could not infer "nextVersion" from the "package.json" or "lerna.json" file"#)]
    MissingNextVersion,

    /// The credential environment variable for the selected host is unset.
    #[error("Must provide {var}")]
    MissingCredential {
        /// Name of the environment variable that was consulted.
        var: &'static str,
    },
}
