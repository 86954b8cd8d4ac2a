//! Integration tests for the auth backend HTTP surface.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatekit::backend::AuthBackend;
use gatekit::error::GatekitError;

fn bearer(token: &str) -> HashMap<String, String> {
    HashMap::from([("Authorization".to_string(), format!("Bearer {token}"))])
}

#[tokio::test]
async fn verify_token_is_true_only_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .and(body_partial_json(serde_json::json!({"token": "good"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    assert!(backend.verify_token("good").await);
    assert!(!backend.verify_token("bad").await);
}

#[tokio::test]
async fn verify_token_treats_transport_failure_as_not_verified() {
    let backend = AuthBackend::new("http://127.0.0.1:9", "http://127.0.0.1:9");
    assert!(!backend.verify_token("any").await);
}

#[tokio::test]
async fn cookie_conversion_sends_the_jwt_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .and(body_partial_json(serde_json::json!({
            "type": "jwt",
            "token": "tok-1",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    backend.convert_token_to_cookie("tok-1").await.unwrap();
}

#[tokio::test]
async fn cookie_conversion_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad token"))
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    match backend.convert_token_to_cookie("tok-1").await {
        Err(GatekitError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad token");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_user_data_unwraps_the_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "user": {
                    "user_id": "user-1",
                    "current_session": {
                        "uid": "0xabc",
                        "provider": "metamask",
                        "connector_type": "injected",
                        "session": {
                            "uid": "0xabc",
                            "provider": "metamask",
                            "connector_type": "injected",
                            "chain_id": 1,
                            "created_at": "2026-08-01T00:00:00Z",
                        },
                    },
                },
                "idps": [],
            }
        })))
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    let user = backend.get_user_data(&bearer("tok-1")).await.unwrap();
    assert_eq!(user.user.user_id, "user-1");
    assert_eq!(user.user.current_session.session.chain_id, Some(1));
}

#[tokio::test]
async fn get_user_data_retries_transient_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "user": {
                    "user_id": "user-1",
                    "current_session": {
                        "uid": "0xabc",
                        "provider": "metamask",
                        "connector_type": "injected",
                        "session": {
                            "uid": "0xabc",
                            "provider": "metamask",
                            "connector_type": "injected",
                            "created_at": "2026-08-01T00:00:00Z",
                        },
                    },
                },
                "idps": [],
            }
        })))
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    let user = backend.get_user_data(&bearer("tok-1")).await.unwrap();
    assert_eq!(user.user.user_id, "user-1");
}

#[tokio::test]
async fn get_user_identifier_posts_the_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/ident"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(body_partial_json(serde_json::json!({"user_id": "user-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"identifier": "ident-7"})),
        )
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    let identifier = backend
        .get_user_identifier("user-1", &bearer("tok-1"))
        .await
        .unwrap();
    assert_eq!(identifier, "ident-7");
}

#[tokio::test]
async fn get_user_identifier_surfaces_authorization_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/ident"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let backend = AuthBackend::new(server.uri(), server.uri());
    match backend.get_user_identifier("user-1", &HashMap::new()).await {
        Err(GatekitError::Api { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected Api error, got {other:?}"),
    }
}
