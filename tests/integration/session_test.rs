// Session factory: default headers, cookie handling, redirects, timeouts

use super::test_utils::{config_for, info_body, mount_info, PUBLIC_INFO};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use translation_conformance::{HarnessError, Session};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_every_request_carries_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLIC_INFO))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(info_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "hi"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let shared = Session::shared(&config).unwrap();
    let public = Session::public(&config).unwrap();

    assert_eq!(shared.get(PUBLIC_INFO).await.unwrap().status(), StatusCode::OK);
    assert_eq!(public.get(PUBLIC_INFO).await.unwrap().status(), StatusCode::OK);
    let created = public.post_json("/echo", &json!({"title": "hi"})).await.unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
}

async fn mount_cookie_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "connect.sid=abc123; Path=/; HttpOnly"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chats"))
        .and(header("cookie", "connect.sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chats"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(2)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_shared_session_keeps_cookies_between_requests() {
    let server = MockServer::start().await;
    mount_cookie_login(&server).await;

    let session = Session::shared(&config_for(&server)).unwrap();
    session.get("/login").await.unwrap();
    let chats = session.get("/api/chats").await.unwrap();

    assert_eq!(chats.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_session_does_not_keep_cookies() {
    let server = MockServer::start().await;
    mount_cookie_login(&server).await;

    let session = Session::public(&config_for(&server)).unwrap();
    session.get("/login").await.unwrap();
    let chats = session.get("/api/chats").await.unwrap();

    assert_eq!(chats.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chats"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::shared(&config_for(&server)).unwrap();
    let response = session.get("/api/chats").await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_request_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLIC_INFO))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(info_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.target.request_timeout_secs = 1;
    let session = Session::public(&config).unwrap();

    match session.get(PUBLIC_INFO).await {
        Err(HarnessError::Transport(e)) => assert!(e.is_timeout(), "{e}"),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_target_is_transport_error() {
    let mut config = config_for(&MockServer::start().await);
    config.target.base_url = "http://127.0.0.1:9".to_string();
    let session = Session::public(&config).unwrap();

    let err = session.get(PUBLIC_INFO).await.unwrap_err();
    assert!(matches!(err, HarnessError::Transport(_)));
}

#[tokio::test]
async fn test_response_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    mount_info(&server, info_body()).await;

    let session = Session::public(&config_for(&server)).unwrap();
    let response = session.get(PUBLIC_INFO).await.unwrap();
    let parsed = response.json().unwrap();

    assert_eq!(parsed, info_body());
    session.close();
}
