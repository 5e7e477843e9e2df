use repo_drop::{Account, GitRemote, PublishOptions, Publisher, RemoteError, RepositorySpec, Visibility};
use repo_drop_github::GitHubClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account() -> Account {
    Account::new("octocat", "test-token")
}

#[tokio::test]
async fn create_repository_posts_visibility_and_auto_init() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({
            "name": "demo",
            "description": "Dropped files",
            "private": false,
            "auto_init": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "demo",
            "full_name": "octocat/demo",
            "default_branch": "main",
            "private": false,
            "html_url": "https://github.com/octocat/demo"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = Publisher::new(GitHubClient::new(Some(server.uri())), PublishOptions::default());
    let spec = RepositorySpec {
        name: "demo".into(),
        description: "Dropped files".into(),
        visibility: Visibility::Public,
        auto_init: true,
    };

    let created = publisher.create_repository(&account(), &spec).await.unwrap();

    assert_eq!(created.full_name, "octocat/demo");
    assert!(!created.private);
    assert_eq!(created.html_url.as_deref(), Some("https://github.com/octocat/demo"));
}

#[tokio::test]
async fn create_repository_defaults_to_private() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_json(json!({
            "name": "secret",
            "description": "",
            "private": true,
            "auto_init": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "secret",
            "full_name": "octocat/secret",
            "private": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new(Some(server.uri()));
    let created = client
        .create_repository(&account(), &RepositorySpec::new("secret"))
        .await
        .unwrap();

    assert!(created.private);
    assert!(created.default_branch.is_none());
}

#[tokio::test]
async fn create_repository_surfaces_validation_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Repository creation failed.",
            "errors": [{ "resource": "Repository", "field": "name", "message": "name already exists on this account" }]
        })))
        .mount(&server)
        .await;

    let client = GitHubClient::new(Some(server.uri()));
    let err = client
        .create_repository(&account(), &RepositorySpec::new("demo"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RemoteError::Status {
            status: 422,
            message: "Repository creation failed.".into(),
        }
    );
}

#[tokio::test]
async fn get_repository_maps_404_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let client = GitHubClient::new(Some(server.uri()));
    let repo = client.get_repository(&account(), "ghost").await.unwrap();
    assert!(repo.is_none());
}

#[tokio::test]
async fn get_repository_reports_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .mount(&server)
        .await;

    let client = GitHubClient::new(Some(server.uri()));
    let err = client.get_repository(&account(), "demo").await.unwrap_err();
    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn authenticated_user_returns_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "octocat",
            "name": "The Octocat",
            "id": 1
        })))
        .mount(&server)
        .await;

    let client = GitHubClient::new(Some(server.uri()));
    let user = client.authenticated_user("test-token").await.unwrap();
    assert_eq!(user.login, "octocat");
    assert_eq!(user.name.as_deref(), Some("The Octocat"));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let client = GitHubClient::new(Some("http://127.0.0.1:9".into()));
    let err = client.get_repository(&account(), "demo").await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}
