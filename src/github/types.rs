//! Hosting API response records.

use serde::{Deserialize, Serialize};

/// Marker present on issues that are pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PullRequestRef {
    /// Web URL of the pull request.
    pub html_url: String,
}

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    /// Label name.
    pub name: String,
}

/// The author of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueAuthor {
    /// Login name.
    pub login: String,
    /// Profile URL.
    pub html_url: String,
}

/// `GET /repos/{repo}/issues/{number}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueRecord {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Set when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
    /// Attached labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Issue author.
    pub user: IssueAuthor,
}

impl IssueRecord {
    /// Whether this issue is a pull request.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Names of the attached labels, in API order.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }
}

/// `GET /users/{login}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRecord {
    /// Login name.
    pub login: String,
    /// Display name; users may leave it unset.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile URL.
    pub html_url: String,
}
