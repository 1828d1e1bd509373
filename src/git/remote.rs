//! Repository URL normalization and `owner/name` inference.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

/// Web root of the public hosting site, used when no `gitUrl` is configured.
pub const DEFAULT_GIT_URL: &str = "https://github.com";

/// npm-style `host:owner/name` shorthands.
const SHORTHAND_HOSTS: &[(&str, &str)] = &[
    ("github", "github.com"),
    ("gitlab", "gitlab.com"),
    ("bitbucket", "bitbucket.org"),
];

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static SHORTHAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<provider>[a-z]+):)?(?P<path>[\w.-]+/[\w.-]+)$").unwrap()
});

/// `user@host:path`, the scp form git accepts for ssh remotes.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static SCP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^@/\s]+@)?(?P<host>[^:/\s]+):(?P<path>[^/].*)$").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());

/// Normalizes a declared repository reference into `https://<host>/<path>`.
///
/// Accepts full URLs (`https`, `http`, `git`, `ssh`, and their `git+`
/// variants), scp-style `git@host:owner/name` remotes and npm shorthands
/// (`github:owner/name`, bare `owner/name`). Fragments, trailing slashes and
/// a `.git` suffix are dropped. Applying it to its own output is a no-op.
/// Anything unrecognised is returned with only the suffix cleanup applied.
pub fn normalize_repository_url(reference: &str) -> String {
    let reference = reference.split('#').next().unwrap_or(reference);
    let reference = strip_suffixes(reference);

    let normalized = expand_shorthand(reference)
        .or_else(|| normalize_url_form(reference))
        .unwrap_or_else(|| reference.to_string());

    strip_suffixes(&normalized).to_string()
}

fn expand_shorthand(reference: &str) -> Option<String> {
    let caps = SHORTHAND_PATTERN.captures(reference)?;
    let host = match caps.name("provider") {
        None => "github.com",
        Some(provider) => SHORTHAND_HOSTS
            .iter()
            .find(|(name, _)| *name == provider.as_str())
            .map(|(_, host)| *host)?,
    };
    canonical_from_str(&format!("https://{host}/{}", &caps["path"]))
}

fn normalize_url_form(reference: &str) -> Option<String> {
    let reference = reference.strip_prefix("git+").unwrap_or(reference);

    if SCHEME_PREFIX.is_match(reference) {
        if let Some(canonical) = canonical_from_str(reference) {
            return Some(canonical);
        }
        // `ssh://git@host:owner/name` only parses once the scheme is gone
        let rest = reference.strip_prefix("ssh://")?;
        return canonical_from_scp(rest);
    }

    canonical_from_scp(reference)
}

fn canonical_from_scp(reference: &str) -> Option<String> {
    let caps = SCP_PATTERN.captures(reference)?;
    canonical_from_str(&format!("https://{}/{}", &caps["host"], &caps["path"]))
}

fn canonical_from_str(candidate: &str) -> Option<String> {
    let url = Url::parse(candidate).ok()?;
    let keep_port = match url.scheme() {
        "https" | "http" => true,
        "ssh" | "git" => false,
        _ => return None,
    };
    let host = url.host_str()?.to_ascii_lowercase();
    let port = match url.port() {
        Some(port) if keep_port => format!(":{port}"),
        _ => String::new(),
    };
    Some(format!("https://{host}{port}{}", url.path()))
}

fn strip_suffixes(mut url: &str) -> &str {
    url = url.trim_start();
    loop {
        let trimmed = url
            .trim_end()
            .trim_end_matches('/')
            .trim_end_matches(".git");
        if trimmed == url {
            return url;
        }
        url = trimmed;
    }
}

/// Extracts the `owner/name` identifier of a repository hosted under `git_url`.
///
/// `git_url` is the web root of the hosting site; its scheme and trailing
/// slash are ignored and the match is anchored to its host, so a URL on any
/// other host yields `None`. The host is compared case-insensitively, as
/// [`normalize_repository_url`] lowercases it. Only the first occurrence is
/// considered.
///
/// Owner and name may contain dots: `acme/widgets.js` is returned whole
/// rather than cut at the first dot, and only a trailing `.git` is dropped.
pub fn repo_from_url(normalized_url: &str, git_url: &str) -> Option<String> {
    let base = SCHEME_PREFIX.replace(git_url.trim(), "");
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let base = match base.split_once('/') {
        Some((host, path)) => format!("{}/{path}", host.to_ascii_lowercase()),
        None => base.to_ascii_lowercase(),
    };

    let pattern = format!(
        r"(?:^|[/@]){}[:/](?P<repo>[^/:\s]+/[^/\s]+?)(?:\.git)?(?:[/?#]|$)",
        regex::escape(&base)
    );
    let repo_regex = Regex::new(&pattern).ok()?;

    let repo = repo_regex
        .captures(normalized_url)
        .map(|caps| caps["repo"].to_string());
    debug!(url = %normalized_url, host = %base, repo = ?repo, "Matched repository URL against host");
    repo
}
