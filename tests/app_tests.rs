//! Integration tests for the authentication app: token lifecycle ordering,
//! verification downgrades, and the start-authentication flow.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatekit::app::{AuthenticationApp, AuthenticationAppOptions};
use gatekit::backend::AuthBackend;
use gatekit::channel::ChannelFactory;
use gatekit::config::GatekitConfig;
use gatekit::error::GatekitError;
use gatekit::frame::FrameOutcome;
use gatekit::storage::{keys, MemoryStorage, Storage};
use gatekit::types::{ConnectorType, CurrentSession, Session, UserData};

use common::{MockWallet, MockWalletFactory};

fn app_against(
    server_uri: &str,
    factory: Arc<dyn ChannelFactory>,
) -> (AuthenticationApp, Arc<dyn Storage>) {
    let config = GatekitConfig::new();
    config.set_project_identifier("proj-1");
    config.set_auth_base_url(server_uri);
    config.set_project_base_url(server_uri);
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = AuthenticationApp::new(
        AuthenticationAppOptions::builder()
            .config(config)
            .storage(storage.clone())
            .channels(factory)
            .backend(AuthBackend::new(server_uri, server_uri))
            .build(),
    );
    (app, storage)
}

fn wallet_factory() -> Arc<dyn ChannelFactory> {
    Arc::new(MockWalletFactory::new(MockWallet::new(&["0xabc"], 1)))
}

fn sample_user_data(uid: &str) -> UserData {
    serde_json::from_value(serde_json::json!({
        "user": {
            "user_id": "user-1",
            "current_session": {
                "uid": uid,
                "provider": "metamask",
                "connector_type": "injected",
                "session": {
                    "uid": uid,
                    "provider": "metamask",
                    "connector_type": "injected",
                    "chain_id": 1,
                    "accounts": [uid],
                    "created_at": "2026-08-01T00:00:00Z",
                },
            },
        },
        "idps": [],
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Token verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn is_authenticated_is_false_without_any_token() {
    // No backend mock: the fast path must not make a network call.
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());
    assert!(!app.is_authenticated().await);
}

#[tokio::test]
async fn is_authenticated_downgrades_a_401_to_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    storage
        .set_item(keys::AUTH_TOKEN, &"stale-token".to_string())
        .await
        .unwrap();

    assert!(!app.is_authenticated().await);
}

#[tokio::test]
async fn is_authenticated_accepts_a_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .and(body_partial_json(serde_json::json!({"token": "good-token"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    storage
        .set_item(keys::AUTH_TOKEN, &"good-token".to_string())
        .await
        .unwrap();

    assert!(app.is_authenticated().await);
}

#[tokio::test]
async fn verify_token_swallows_transport_failures() {
    // Nothing is listening here.
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());
    assert!(!app.verify_token("any").await);
}

// ---------------------------------------------------------------------------
// store_jwt_token ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_jwt_token_commits_cookie_storage_and_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .and(body_partial_json(serde_json::json!({
            "type": "jwt",
            "token": "fresh-token",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    app.store_jwt_token("fresh-token").await.unwrap();

    let stored: Option<String> = storage.get_item(keys::AUTH_TOKEN).await.unwrap();
    assert_eq!(stored.as_deref(), Some("fresh-token"));
    // Cache was updated last, with exactly the persisted token.
    assert_eq!(
        app.get_authentication_headers(None)["Authorization"],
        "Bearer fresh-token"
    );
}

#[tokio::test]
async fn cookie_conversion_failure_leaves_storage_and_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    let err = app.store_jwt_token("doomed-token").await.unwrap_err();
    assert!(matches!(err, GatekitError::Api { status: 500, .. }));

    let stored: Option<String> = storage.get_item(keys::AUTH_TOKEN).await.unwrap();
    assert!(stored.is_none());
    assert!(app.get_authentication_headers(None).is_empty());
}

#[tokio::test]
async fn cookie_conversion_transport_fault_also_aborts() {
    let (app, storage) = app_against("http://127.0.0.1:9", wallet_factory());
    assert!(app.store_jwt_token("doomed-token").await.is_err());
    let stored: Option<String> = storage.get_item(keys::AUTH_TOKEN).await.unwrap();
    assert!(stored.is_none());
}

// ---------------------------------------------------------------------------
// User data persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_user_data_sets_the_current_session() {
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());
    let user = sample_user_data("0xabc");

    app.save_user_data(&user).await.unwrap();

    let current = app.get_current_session().await.unwrap().unwrap();
    assert_eq!(current.uid, "0xabc");
    assert_eq!(current.provider, "metamask");
    assert_eq!(current.session.chain_id, Some(1));
}

#[tokio::test]
async fn a_new_login_overwrites_the_prior_session() {
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());
    app.save_user_data(&sample_user_data("0xaaa")).await.unwrap();
    app.save_user_data(&sample_user_data("0xbbb")).await.unwrap();

    let current = app.get_current_session().await.unwrap().unwrap();
    assert_eq!(current.uid, "0xbbb");
}

#[tokio::test]
async fn get_user_data_round_trips_the_envelope() {
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
                            "created_at": "2026-08-01T00:00:00Z",
                        },
                    },
                },
                "idps": [
                    {"uid": "0xabc", "provider": "metamask"},
                ],
            }
        })))
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    let user = app.get_user_data(Some("tok-1")).await.unwrap();
    assert_eq!(user.user.user_id, "user-1");
    assert_eq!(user.idps.len(), 1);
    assert_eq!(user.idps[0].provider, "metamask");
}

// ---------------------------------------------------------------------------
// start_authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decentralized_start_produces_a_connected_session() {
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());

    let started = app.start_authentication("metamask").await.unwrap();
    assert_eq!(started.provider, "metamask");
    match started.outcome {
        FrameOutcome::Connected { session } => {
            assert_eq!(session.uid, "0xabc");
            assert_eq!(session.chain_id, Some(1));
            assert_eq!(session.connector_type, ConnectorType::Injected);
        }
        other => panic!("expected Connected, got {other:?}"),
    }
}

#[tokio::test]
async fn centralized_start_produces_an_authorization_request() {
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());

    let started = app.start_authentication("google").await.unwrap();
    match started.outcome {
        FrameOutcome::AuthorizationRequest { params } => {
            assert_eq!(params["project_id"], "proj-1");
            assert_eq!(params["provider"], "google");
            assert!(!params.contains_key("user_identifier"));
        }
        other => panic!("expected AuthorizationRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn authenticated_start_includes_the_user_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200))
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
    Mock::given(method("POST"))
        .and(path("/user/ident"))
        .and(body_partial_json(serde_json::json!({"user_id": "user-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"identifier": "ident-7"})),
        )
        .mount(&server)
        .await;

    let (app, storage) = app_against(&server.uri(), wallet_factory());
    storage
        .set_item(keys::AUTH_TOKEN, &"good-token".to_string())
        .await
        .unwrap();

    let started = app.start_authentication("google").await.unwrap();
    match started.outcome {
        FrameOutcome::AuthorizationRequest { params } => {
            assert_eq!(params["user_identifier"], "ident-7");
        }
        other => panic!("expected AuthorizationRequest, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Session restore round trip through the app's storage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_session_survives_the_storage_round_trip() {
    let (app, _storage) = app_against("http://127.0.0.1:9", wallet_factory());

    let started = app.start_authentication("metamask").await.unwrap();
    let FrameOutcome::Connected { session } = started.outcome else {
        panic!("expected Connected");
    };
    let current = CurrentSession::from(session.clone());
    app.set_current_session(&current).await.unwrap();

    let loaded = app.get_current_session().await.unwrap().unwrap();
    assert_eq!(loaded, current);
    let restored: Session = loaded.session;
    assert_eq!(restored.uid, "0xabc");
    assert_eq!(restored.chain_id, Some(1));
}
