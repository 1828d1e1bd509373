//! Built-in label and committer defaults.

use indexmap::{IndexMap, IndexSet};

/// Label name to section heading, in rendering order.
const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("breaking", ":boom: Breaking Change"),
    ("enhancement", ":rocket: Enhancement"),
    ("bug", ":bug: Bug Fix"),
    ("documentation", ":memo: Documentation"),
    ("internal", ":house: Internal"),
];

/// Dependency bots, in both their legacy and `[bot]` login spellings.
const DEFAULT_IGNORE_COMMITTERS: &[&str] = &[
    "dependabot-bot",
    "dependabot[bot]",
    "greenkeeperio-bot",
    "greenkeeper[bot]",
    "renovate-bot",
    "renovate[bot]",
];

/// Labels used when the configuration declares none.
pub fn default_labels() -> IndexMap<String, String> {
    DEFAULT_LABELS
        .iter()
        .map(|(name, heading)| (name.to_string(), heading.to_string()))
        .collect()
}

/// Committers ignored when the configuration declares none.
pub fn default_ignore_committers() -> IndexSet<String> {
    DEFAULT_IGNORE_COMMITTERS
        .iter()
        .map(|login| login.to_string())
        .collect()
}
