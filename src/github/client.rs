//! Hosting API client for issue and user metadata.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use super::fetch::{CachedFetcher, HttpTransport, ResponseCache, Transport};
use super::types::{IssueRecord, UserRecord};
use crate::config::Configuration;
use crate::error::ConfigurationError;
use crate::git::DEFAULT_GIT_URL;
use crate::utils::EnvSource;

/// API root of the public hosting service.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Credential variable for the public hosting service.
pub const PUBLIC_AUTH_VAR: &str = "GITHUB_AUTH";

/// Credential variable used when a custom API root is configured.
pub const ENTERPRISE_AUTH_VAR: &str = "GITHUB_ENTERPRISE_AUTH";

/// Subdirectory of the configured cache directory owned by this client.
pub const CACHE_NAMESPACE: &str = "github";

/// Base URLs and credential source of one hosting instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Environment variable holding the API token.
    pub credential_env_var: &'static str,
    /// API root, without trailing slash.
    pub api_base: String,
    /// Web root, without trailing slash.
    pub web_base: String,
}

/// Which kind of hosting instance the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostProfile {
    /// The public service.
    Public(Endpoints),
    /// A self-hosted instance, signalled by a configured API root.
    Enterprise(Endpoints),
}

impl HostProfile {
    /// Picks the profile from the configured URLs.
    ///
    /// A non-empty `git_api_url` selects [`HostProfile::Enterprise`].
    pub fn select(git_api_url: Option<&str>, git_url: Option<&str>) -> Self {
        let web_base = trim_base(non_empty(git_url).unwrap_or(DEFAULT_GIT_URL));

        match non_empty(git_api_url) {
            Some(api) => HostProfile::Enterprise(Endpoints {
                credential_env_var: ENTERPRISE_AUTH_VAR,
                api_base: trim_base(api),
                web_base,
            }),
            None => HostProfile::Public(Endpoints {
                credential_env_var: PUBLIC_AUTH_VAR,
                api_base: trim_base(DEFAULT_API_URL),
                web_base,
            }),
        }
    }

    /// The endpoints of either variant.
    pub fn endpoints(&self) -> &Endpoints {
        match self {
            HostProfile::Public(endpoints) | HostProfile::Enterprise(endpoints) => endpoints,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Construction parameters, normally taken from a [`Configuration`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Repository identifier (`owner/name`).
    pub repo: String,
    /// Absolute repository root.
    pub root_path: PathBuf,
    /// Cache directory relative to `root_path`; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// Custom API root.
    pub git_api_url: Option<String>,
    /// Custom web root.
    pub git_url: Option<String>,
}

impl From<&Configuration> for ClientOptions {
    fn from(config: &Configuration) -> Self {
        Self {
            repo: config.repo.clone(),
            root_path: config.root_path.clone(),
            cache_dir: config.cache_dir.clone(),
            git_api_url: config.git_api_url.clone(),
            git_url: config.git_url.clone(),
        }
    }
}

/// Authenticated, cached access to issues and users.
pub struct MetadataClient {
    repo: String,
    host: HostProfile,
    auth: String,
    fetcher: CachedFetcher,
}

impl MetadataClient {
    /// Creates a client that talks HTTP through `reqwest`.
    pub fn new(options: &ClientOptions, env: &dyn EnvSource) -> Result<Self> {
        // Credential check first so a missing token is reported as such
        let (host, auth) = select_credential(options, env)?;
        let transport = HttpTransport::new()?;
        Ok(Self::assemble(options, host, auth, Box::new(transport)))
    }

    /// Creates a client on top of a custom transport.
    pub fn with_transport(
        options: &ClientOptions,
        env: &dyn EnvSource,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ConfigurationError> {
        let (host, auth) = select_credential(options, env)?;
        Ok(Self::assemble(options, host, auth, transport))
    }

    fn assemble(
        options: &ClientOptions,
        host: HostProfile,
        auth: String,
        transport: Box<dyn Transport>,
    ) -> Self {
        let cache = options.cache_dir.as_ref().map(|dir| {
            ResponseCache::new(options.root_path.join(dir).join(CACHE_NAMESPACE))
        });

        debug!(
            host = ?host,
            cache = ?cache.as_ref().map(ResponseCache::dir),
            "Created metadata client"
        );

        Self {
            repo: options.repo.clone(),
            host,
            auth,
            fetcher: CachedFetcher::new(transport, cache),
        }
    }

    /// The repository this client was configured for.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The selected hosting profile.
    pub fn host(&self) -> &HostProfile {
        &self.host
    }

    /// The response cache in use, if caching is enabled.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.fetcher.cache()
    }

    /// Web URL prefix of the issues of `repo`; append a number to link one.
    pub fn issue_url(&self, repo: &str) -> String {
        format!("{}/{repo}/issues/", self.host.endpoints().web_base)
    }

    /// Fetches issue (or pull request) `number` of `repo`.
    pub async fn get_issue(&self, repo: &str, number: u64) -> Result<IssueRecord> {
        let url = format!(
            "{}/repos/{repo}/issues/{number}",
            self.host.endpoints().api_base
        );
        self.fetch(&url).await
    }

    /// Fetches the profile of `login`.
    pub async fn get_user(&self, login: &str) -> Result<UserRecord> {
        let url = format!("{}/users/{login}", self.host.endpoints().api_base);
        self.fetch(&url).await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let headers = [
            ("Authorization", format!("token {}", self.auth)),
            ("Accept", "application/vnd.github+json".to_string()),
        ];
        self.fetcher.get_json(url, &headers).await
    }
}

fn select_credential(
    options: &ClientOptions,
    env: &dyn EnvSource,
) -> Result<(HostProfile, String), ConfigurationError> {
    let host = HostProfile::select(options.git_api_url.as_deref(), options.git_url.as_deref());
    let var = host.endpoints().credential_env_var;
    let auth = env
        .var(var)
        .ok_or(ConfigurationError::MissingCredential { var })?;
    Ok((host, auth))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::github::fetch::test_utils::CountingTransport;
    use crate::utils::MapEnv;
    use tempfile::TempDir;

    const ISSUE_JSON: &str = r#"{
        "number": 12,
        "title": "Fix widget alignment",
        "pull_request": { "html_url": "https://github.com/acme/widgets/pull/12" },
        "labels": [{ "name": "bug" }],
        "user": { "login": "octocat", "html_url": "https://github.com/octocat" }
    }"#;

    fn options() -> ClientOptions {
        ClientOptions {
            repo: "acme/widgets".to_string(),
            root_path: PathBuf::from("/repo"),
            ..Default::default()
        }
    }

    fn public_env() -> MapEnv {
        MapEnv::new([(PUBLIC_AUTH_VAR, "public-token")])
    }

    #[test]
    fn public_profile_by_default() {
        let host = HostProfile::select(None, None);
        assert_eq!(
            host,
            HostProfile::Public(Endpoints {
                credential_env_var: PUBLIC_AUTH_VAR,
                api_base: "https://api.github.com".to_string(),
                web_base: "https://github.com".to_string(),
            })
        );
    }

    #[test]
    fn custom_api_url_selects_enterprise() {
        let host = HostProfile::select(
            Some("https://ghe.example/api/v3/"),
            Some("https://ghe.example/"),
        );
        assert!(matches!(host, HostProfile::Enterprise(_)));
        assert_eq!(host.endpoints().credential_env_var, ENTERPRISE_AUTH_VAR);
        assert_eq!(host.endpoints().api_base, "https://ghe.example/api/v3");
        assert_eq!(host.endpoints().web_base, "https://ghe.example");
    }

    #[test]
    fn empty_api_url_is_public() {
        assert!(matches!(
            HostProfile::select(Some(""), None),
            HostProfile::Public(_)
        ));
    }

    #[test]
    fn issue_url_with_default_web_base() {
        let client = MetadataClient::with_transport(
            &options(),
            &public_env(),
            Box::new(CountingTransport::new("{}")),
        )
        .unwrap();

        assert_eq!(
            client.issue_url("acme/widgets"),
            "https://github.com/acme/widgets/issues/"
        );
    }

    #[test]
    fn missing_public_credential_fails() {
        let result = MetadataClient::with_transport(
            &options(),
            &MapEnv::default(),
            Box::new(CountingTransport::new("{}")),
        );

        assert_eq!(
            result.err(),
            Some(ConfigurationError::MissingCredential {
                var: PUBLIC_AUTH_VAR
            })
        );
    }

    #[test]
    fn enterprise_ignores_public_credential() {
        let options = ClientOptions {
            git_api_url: Some("https://ghe.example/api/v3".to_string()),
            ..options()
        };

        let result = MetadataClient::with_transport(
            &options,
            &public_env(),
            Box::new(CountingTransport::new("{}")),
        );

        assert_eq!(
            result.err(),
            Some(ConfigurationError::MissingCredential {
                var: ENTERPRISE_AUTH_VAR
            })
        );
    }

    #[test]
    fn cache_disabled_without_cache_dir() {
        let client = MetadataClient::with_transport(
            &options(),
            &public_env(),
            Box::new(CountingTransport::new("{}")),
        )
        .unwrap();
        assert!(client.cache().is_none());
    }

    #[test]
    fn cache_dir_is_namespaced_under_root() {
        let options = ClientOptions {
            cache_dir: Some(PathBuf::from(".changelog")),
            ..options()
        };
        let client = MetadataClient::with_transport(
            &options,
            &public_env(),
            Box::new(CountingTransport::new("{}")),
        )
        .unwrap();

        assert_eq!(
            client.cache().unwrap().dir(),
            PathBuf::from("/repo/.changelog/github")
        );
    }

    #[tokio::test]
    async fn get_issue_requests_api_url_with_token() {
        let transport = CountingTransport::new(ISSUE_JSON);
        let requests = transport.requests();
        let client =
            MetadataClient::with_transport(&options(), &public_env(), Box::new(transport))
                .unwrap();

        let issue = client.get_issue("acme/widgets", 12).await.unwrap();
        assert_eq!(issue.title, "Fix widget alignment");
        assert!(issue.is_pull_request());

        let requests = requests.lock().unwrap();
        let (url, headers) = &requests[0];
        assert_eq!(url, "https://api.github.com/repos/acme/widgets/issues/12");
        assert!(headers.contains(&(
            "Authorization".to_string(),
            "token public-token".to_string()
        )));
    }

    #[tokio::test]
    async fn enterprise_requests_use_enterprise_base_and_token() {
        let options = ClientOptions {
            git_api_url: Some("https://ghe.example/api/v3/".to_string()),
            ..options()
        };
        let env = MapEnv::new([(ENTERPRISE_AUTH_VAR, "ghe-token")]);
        let transport = CountingTransport::new(
            r#"{ "login": "hubot", "name": "Hubot", "html_url": "https://ghe.example/hubot" }"#,
        );
        let requests = transport.requests();
        let client = MetadataClient::with_transport(&options, &env, Box::new(transport)).unwrap();

        let user = client.get_user("hubot").await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Hubot"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, "https://ghe.example/api/v3/users/hubot");
        assert!(requests[0].1.contains(&(
            "Authorization".to_string(),
            "token ghe-token".to_string()
        )));
    }

    #[tokio::test]
    async fn repeated_issue_lookup_hits_cache() {
        let temp_dir = TempDir::new().unwrap();
        let options = ClientOptions {
            root_path: temp_dir.path().to_path_buf(),
            cache_dir: Some(PathBuf::from(".changelog")),
            ..options()
        };
        let transport = CountingTransport::new(ISSUE_JSON);
        let calls = transport.calls();
        let client =
            MetadataClient::with_transport(&options, &public_env(), Box::new(transport)).unwrap();

        let first = client.get_issue("acme/widgets", 12).await.unwrap();
        let second = client.get_issue("acme/widgets", 12).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(temp_dir.path().join(".changelog/github").is_dir());
    }
}
