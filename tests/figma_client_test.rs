//! Integration tests for the Figma HTTP client against a mock server

use figport::adapters::figma::{FigmaApi, FigmaHttpClient, FlowControlConfig, FlowControlledClient};
use figport::config::{AccessToken, FigmaConfig};
use figport::domain::{ExportFormat, FigmaApiError, FileKey, NodeId};
use mockito::Matcher;

fn client_for(server: &mockito::ServerGuard) -> FigmaHttpClient {
    let config = FigmaConfig {
        base_url: server.url(),
        access_token: AccessToken::new("figd_test"),
        timeout_seconds: 5,
        ..FigmaConfig::default()
    };
    FigmaHttpClient::new(&config).unwrap()
}

fn file_key() -> FileKey {
    FileKey::new("FpKcPBk2q3wDhYzTfwBDq1").unwrap()
}

#[tokio::test]
async fn test_get_file_sends_token_and_parses_version() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/files/FpKcPBk2q3wDhYzTfwBDq1")
        .match_header("X-Figma-Token", "figd_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"name":"Brand","version":"4711","lastModified":"2025-01-02T03:04:05Z","#.to_string()
                + r#""document":{"id":"0:0"}}"#,
        )
        .create_async()
        .await;

    let file = client_for(&server).get_file(&file_key()).await.unwrap();

    assert_eq!(file.name, "Brand");
    assert_eq!(file.version, "4711");
    assert_eq!(file.last_modified.as_deref(), Some("2025-01-02T03:04:05Z"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_images_builds_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/images/FpKcPBk2q3wDhYzTfwBDq1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "1:2,1:3".into()),
            Matcher::UrlEncoded("format".into(), "svg".into()),
            Matcher::UrlEncoded("scale".into(), "2".into()),
            Matcher::UrlEncoded("contents_only".into(), "false".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"err":null,"images":{"1:2":"https://cdn/1.svg","1:3":null}}"#)
        .create_async()
        .await;

    let ids = vec![NodeId::new("1:2").unwrap(), NodeId::new("1:3").unwrap()];
    let images = client_for(&server)
        .get_images(&file_key(), &ids, ExportFormat::Svg, 2.0, Some(false))
        .await
        .unwrap();

    assert_eq!(images.url_for("1:2"), Some("https://cdn/1.svg"));
    assert_eq!(images.url_for("1:3"), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_local_variables() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/files/FpKcPBk2q3wDhYzTfwBDq1/variables/local")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status":200,"error":false,"meta":{"#.to_string()
                + r#""variables":{"VariableID:1:1":{"name":"primary"}},"variableCollections":{}}}"#,
        )
        .create_async()
        .await;

    let variables = client_for(&server)
        .get_local_variables(&file_key())
        .await
        .unwrap();

    assert!(!variables.error);
    assert_eq!(variables.meta.variables.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_mapping() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/files/A")
        .with_status(404)
        .with_body(r#"{"status":404,"err":"Not found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/files/B")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;
    server
        .mock("GET", "/v1/files/C")
        .with_status(429)
        .with_body(r#"{"status":429,"err":"Rate limit exceeded"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/files/D")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);

    assert_eq!(
        client.get_file(&FileKey::new("A").unwrap()).await.unwrap_err(),
        FigmaApiError::ClientError {
            status: 404,
            message: "Not found".to_string()
        }
    );
    assert_eq!(
        client.get_file(&FileKey::new("B").unwrap()).await.unwrap_err(),
        FigmaApiError::ServerError {
            status: 500,
            message: "upstream exploded".to_string()
        }
    );
    assert!(client
        .get_file(&FileKey::new("C").unwrap())
        .await
        .unwrap_err()
        .is_rate_limited());
    assert!(matches!(
        client.get_file(&FileKey::new("D").unwrap()).await,
        Err(FigmaApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_flow_control_retries_http_rate_limits() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/files/FpKcPBk2q3wDhYzTfwBDq1")
        .with_status(429)
        .with_body(r#"{"status":429,"err":"Rate limit exceeded"}"#)
        .expect(3)
        .create_async()
        .await;

    let client = FlowControlledClient::new(
        client_for(&server),
        FlowControlConfig {
            concurrency_limit: 1,
            retry_limit: 3,
            backoff_ms: vec![1],
        },
    )
    .unwrap();

    let result = client.get_file(&file_key()).await;

    assert!(matches!(result, Err(FigmaApiError::RateLimited(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_server_is_connection_failure() {
    let config = FigmaConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        access_token: AccessToken::new("figd_test"),
        timeout_seconds: 5,
        ..FigmaConfig::default()
    };
    let client = FigmaHttpClient::new(&config).unwrap();

    let result = client.get_file(&file_key()).await;

    assert!(matches!(
        result,
        Err(FigmaApiError::ConnectionFailed(_)) | Err(FigmaApiError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_requests_go_through_configured_proxy() {
    let mut proxy = mockito::Server::new_async().await;
    let mock = proxy
        .mock("GET", Matcher::Any)
        .match_header("X-Figma-Token", "figd_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"Brand","version":"7","document":{}}"#)
        .create_async()
        .await;

    // The API host doesn't resolve; only the proxy can answer
    let config = FigmaConfig {
        base_url: "http://api.figma.invalid".to_string(),
        access_token: AccessToken::new("figd_test"),
        timeout_seconds: 5,
        proxy: Some(proxy.url()),
        ..FigmaConfig::default()
    };
    let client = FigmaHttpClient::new(&config).unwrap();

    let file = client.get_file(&file_key()).await.unwrap();

    assert_eq!(file.version, "7");
    mock.assert_async().await;
}
