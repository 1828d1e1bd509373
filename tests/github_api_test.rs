use std::fs;
use std::path::PathBuf;

use changelog_kit::config::{resolve, ResolveOptions, PACKAGE_MANIFEST};
use changelog_kit::github::{ClientOptions, MetadataClient, ENTERPRISE_AUTH_VAR, PUBLIC_AUTH_VAR};
use changelog_kit::utils::MapEnv;
use changelog_kit::ConfigurationError;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUE_JSON: &str = r#"{
    "number": 12,
    "title": "Fix widget alignment",
    "pull_request": { "html_url": "https://ghe.example/acme/widgets/pull/12" },
    "labels": [{ "name": "bug" }, { "name": "internal" }],
    "user": { "login": "octocat", "html_url": "https://ghe.example/octocat" }
}"#;

const USER_JSON: &str = r#"{
    "login": "octocat",
    "name": "The Octocat",
    "html_url": "https://ghe.example/octocat"
}"#;

fn enterprise_env() -> MapEnv {
    MapEnv::new([(ENTERPRISE_AUTH_VAR, "ghe-token")])
}

fn options(server: &MockServer, root: &TempDir, cache_dir: Option<&str>) -> ClientOptions {
    ClientOptions {
        repo: "acme/widgets".to_string(),
        root_path: root.path().to_path_buf(),
        cache_dir: cache_dir.map(PathBuf::from),
        git_api_url: Some(format!("{}/", server.uri())),
        git_url: Some("https://ghe.example".to_string()),
    }
}

#[tokio::test]
async fn issue_fetch_is_served_from_cache_on_repeat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues/12"))
        .and(header("Authorization", "token ghe-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ISSUE_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let client =
        MetadataClient::new(&options(&server, &root, Some(".changelog")), &enterprise_env())
            .unwrap();

    let first = client.get_issue("acme/widgets", 12).await.unwrap();
    let second = client.get_issue("acme/widgets", 12).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.label_names().collect::<Vec<_>>(), ["bug", "internal"]);
    assert_eq!(first.user.login, "octocat");
    assert_eq!(
        client.issue_url("acme/widgets"),
        "https://ghe.example/acme/widgets/issues/"
    );
}

#[tokio::test]
async fn without_cache_dir_every_fetch_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_JSON))
        .expect(2)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let client = MetadataClient::new(&options(&server, &root, None), &enterprise_env()).unwrap();

    let user = client.get_user("octocat").await.unwrap();
    client.get_user("octocat").await.unwrap();

    assert_eq!(user.name.as_deref(), Some("The Octocat"));
}

#[tokio::test]
async fn error_status_propagates_and_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .expect(2)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let client =
        MetadataClient::new(&options(&server, &root, Some(".changelog")), &enterprise_env())
            .unwrap();

    let err = client.get_issue("acme/widgets", 404).await.unwrap_err();
    assert!(err.to_string().contains("404"));
    assert!(err.downcast_ref::<ConfigurationError>().is_none());

    // Second attempt goes to the network again
    assert!(client.get_issue("acme/widgets", 404).await.is_err());
}

#[tokio::test]
async fn client_built_from_resolved_configuration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(PACKAGE_MANIFEST),
        format!(
            r#"{{ "changelog": {{
                "repo": "acme/widgets",
                "cacheDir": ".changelog",
                "gitAPIUrl": "{}"
            }} }}"#,
            server.uri()
        ),
    )
    .unwrap();

    let config = resolve(root.path(), ResolveOptions::default()).unwrap();
    let client = MetadataClient::new(&ClientOptions::from(&config), &enterprise_env()).unwrap();

    client.get_user("octocat").await.unwrap();
    client.get_user("octocat").await.unwrap();

    assert!(root.path().join(".changelog").join("github").is_dir());
}

#[test]
fn enterprise_api_with_only_public_credential_fails() {
    let options = ClientOptions {
        repo: "acme/widgets".to_string(),
        root_path: PathBuf::from("/repo"),
        git_api_url: Some("https://ghe.example/api/v3".to_string()),
        ..Default::default()
    };
    let env = MapEnv::new([(PUBLIC_AUTH_VAR, "public-token")]);

    let err = MetadataClient::new(&options, &env).err().unwrap();
    assert_eq!(
        err.downcast_ref::<ConfigurationError>(),
        Some(&ConfigurationError::MissingCredential {
            var: ENTERPRISE_AUTH_VAR
        })
    );
}
