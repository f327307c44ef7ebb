//! GitHub REST client against a mock server

use rstest::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use create_app::github_client::{
    GithubClient, GithubClientConfig, GithubConnector, HostConnector, HostError, RepositoryHost,
};
use create_app::oauth::{AccessToken, AuthError};

async fn client_for(server: &MockServer) -> GithubClient {
    let config = GithubClientConfig {
        api_url: server.uri(),
        ..GithubClientConfig::default()
    };
    GithubClient::new(config, &AccessToken::new("gho_test")).expect("client")
}

#[tokio::test]
async fn test_construction_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let connector = GithubConnector::new(GithubClientConfig {
        api_url: server.uri(),
        ..GithubClientConfig::default()
    });
    assert!(connector.connect(&AccessToken::new("gho_test")).is_ok());
}

#[tokio::test]
async fn test_who_am_i_returns_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_test"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"login": "octocat", "id": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let login = client_for(&server).await.who_am_i().await.unwrap();
    assert_eq!(login, "octocat");
}

#[rstest]
#[case(401)]
#[case(403)]
#[tokio::test]
async fn test_who_am_i_rejected_token(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).await.who_am_i().await;
    assert!(matches!(result, Err(AuthError::TokenRejected(s)) if s == status));
}

#[tokio::test]
async fn test_create_repository_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_json(json!({"name": "my-app", "private": true})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "name": "my-app",
            "full_name": "octocat/my-app",
            "private": true,
            "html_url": "https://github.com/octocat/my-app",
            "clone_url": "https://github.com/octocat/my-app.git"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repository = client_for(&server)
        .await
        .create_repository("my-app", true)
        .await
        .unwrap();

    assert_eq!(repository.name, "my-app");
    assert!(repository.is_private);
    assert_eq!(repository.html_url, "https://github.com/octocat/my-app");
}

#[tokio::test]
async fn test_create_repository_name_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Repository creation failed.",
            "errors": [{
                "resource": "Repository",
                "code": "custom",
                "field": "name",
                "message": "name already exists on this account"
            }]
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .create_repository("my-app", true)
        .await;

    assert!(matches!(result, Err(HostError::NameConflict(name)) if name == "my-app"));
}

#[tokio::test]
async fn test_create_repository_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .create_repository("my-app", false)
        .await;

    assert!(matches!(result, Err(HostError::Unauthorized(m)) if m.contains("Bad credentials")));
}

#[rstest]
#[case(422, "Validation Failed")]
#[case(500, "Server Error")]
#[tokio::test]
async fn test_create_repository_other_failures(#[case] status: u16, #[case] message: &str) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"message": message})))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .create_repository("bad name", false)
        .await;

    match result {
        Err(HostError::Unexpected { status: s, message: m }) => {
            assert_eq!(s, status);
            assert_eq!(m, message);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let config = GithubClientConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        ..GithubClientConfig::default()
    };
    let client = GithubClient::new(config, &AccessToken::new("tok")).unwrap();

    let result = client.create_repository("my-app", true).await;
    assert!(matches!(result, Err(HostError::Network(_))));
}
