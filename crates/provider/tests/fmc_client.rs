//! FmcClient and provider against a mocked FMC REST API

use fmc_common::{Error, ProviderConfig, ICMPV4_OBJECTS};
use fmc_provider::{FmcClient, FmcProvider, RestClient};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLLECTION: &str = "/api/fmc_config/v1/domain/g-uuid/object/icmpv4objects";

async fn mount_platform(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/fmc_platform/v1/info/serverversion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"serverVersion": "7.4.1 (build 172)", "type": "ServerVersion"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/fmc_platform/v1/info/domain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "Global", "uuid": "g-uuid", "type": "Domain"},
                {"name": "Global/Branch", "uuid": "branch-uuid", "type": "Domain"}
            ]
        })))
        .mount(server)
        .await;
}

fn token_config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        url: server.uri(),
        token: Some("api-token".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_login_learns_version_and_domains() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("X-auth-access-token", "session-token")
                .insert_header("DOMAIN_UUID", "branch-uuid"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_platform(&server).await;

    let config = ProviderConfig {
        url: server.uri(),
        username: Some("admin".to_string()),
        password: Some("secret".to_string()),
        ..Default::default()
    };
    let client = FmcClient::connect(&config).await.unwrap();

    assert_eq!(client.version().to_string(), "7.4.1");
    assert_eq!(client.domain_uuid(None).unwrap(), "branch-uuid");
    assert_eq!(client.domain_uuid(Some("Global")).unwrap(), "g-uuid");
    assert!(matches!(
        client.domain_uuid(Some("Elsewhere")),
        Err(Error::DomainNotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_login_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = ProviderConfig {
        url: server.uri(),
        username: Some("admin".to_string()),
        password: Some("wrong".to_string()),
        ..Default::default()
    };

    match FmcClient::connect(&config).await {
        Err(Error::Http { status, .. }) => assert_eq!(status, 401),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("login should fail"),
    }
}

#[tokio::test]
async fn test_error_status_carries_fmc_description() {
    let server = MockServer::start().await;
    mount_platform(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", COLLECTION)))
        .and(header("authorization", "Bearer api-token"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "category": "FRAMEWORK",
                "messages": [{"description": "Object not found"}],
                "severity": "ERROR"
            }
        })))
        .mount(&server)
        .await;

    let client = FmcClient::connect(&token_config(&server)).await.unwrap();
    let err = client
        .get(&format!("{}/missing", COLLECTION))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Http { message, .. } => assert_eq!(message, "Object not found"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_bulk_create_and_refresh_roundtrip() {
    let server = MockServer::start().await;
    mount_platform(&server).await;

    Mock::given(method("POST"))
        .and(path(COLLECTION))
        .and(query_param("bulk", "true"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "items": [
                {"id": "obj-1", "name": "echo", "type": "ICMPV4Object", "icmpType": "8"},
                {"id": "obj-2", "name": "reply", "type": "ICMPV4Object", "icmpType": "0"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .and(query_param("expanded", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "obj-1", "name": "echo", "type": "ICMPV4Object", "icmpType": "8", "code": 0}
            ],
            "paging": {"offset": 0, "limit": 1000, "count": 1, "pages": 1}
        })))
        .mount(&server)
        .await;

    let provider = FmcProvider::connect(&token_config(&server)).await.unwrap();

    let plan = FmcProvider::plan(
        ICMPV4_OBJECTS,
        None,
        &json!({"items": {"echo": {"icmp_type": "8"}, "reply": {"icmp_type": "0"}}}),
    );
    assert_eq!(plan.changes.create, vec!["echo", "reply"]);

    let applied = provider
        .apply(ICMPV4_OBJECTS, None, plan.planned_state.as_ref())
        .await;
    assert!(!applied.has_errors(), "{:?}", applied.diagnostics);
    let state = applied.state.unwrap();
    assert_eq!(state["items"]["echo"]["id"], json!("obj-1"));
    assert_eq!(state["items"]["reply"]["id"], json!("obj-2"));

    let refreshed = provider.read(ICMPV4_OBJECTS, &state).await;
    let state = refreshed.state.unwrap();
    assert!(state["items"].get("reply").is_none());
    assert_eq!(state["items"]["echo"]["icmp_type"], json!("8"));
}
