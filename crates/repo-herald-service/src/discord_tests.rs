//! Tests for the Discord REST connector.

use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> SecretValue {
    SecretValue::from_string("bot-token".to_string())
}

async fn session_for(server: &MockServer) -> Box<dyn ChatSession> {
    let connector = DiscordRestConnector::with_api_base(server.uri());
    connector.connect(&token()).await.unwrap()
}

#[tokio::test]
async fn test_wait_ready_succeeds_with_bot_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bot bot-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1", "bot": true })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server).await;
    session.wait_ready().await.unwrap();
}

#[tokio::test]
async fn test_wait_ready_maps_401_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = session_for(&server).await;

    assert!(matches!(
        session.wait_ready().await,
        Err(DeliveryError::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_wait_ready_maps_server_error_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = session_for(&server).await;

    assert!(matches!(
        session.wait_ready().await,
        Err(DeliveryError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_plain_channel_resolves_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "100", "type": 0 })))
        .mount(&server)
        .await;

    let session = session_for(&server).await;
    assert_eq!(session.target_kind("100").await.unwrap(), TargetKind::Text);
}

#[tokio::test]
async fn test_forum_channel_resolves_to_forum() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "200", "type": 15 })))
        .mount(&server)
        .await;

    let session = session_for(&server).await;
    assert_eq!(session.target_kind("200").await.unwrap(), TargetKind::Forum);
}

#[tokio::test]
async fn test_unknown_channel_is_target_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = session_for(&server).await;

    match session.target_kind("999").await {
        Err(DeliveryError::TargetNotFound { target }) => assert_eq!(target, "999"),
        other => panic!("expected target not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_message_sends_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/100/messages"))
        .and(header("authorization", "Bot bot-token"))
        .and(body_json(json!({ "content": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "5" })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server).await;
    session
        .post_message(&ChannelId::new("100").unwrap(), "hello")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_message_failure_carries_response_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/100/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Permissions"))
        .mount(&server)
        .await;

    let session = session_for(&server).await;

    match session
        .post_message(&ChannelId::new("100").unwrap(), "hello")
        .await
    {
        Err(DeliveryError::Send { message }) => {
            assert!(message.contains("403"));
            assert!(message.contains("Missing Permissions"));
        }
        other => panic!("expected send error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_forum_post_sends_thread_with_opening_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/200/threads"))
        .and(body_json(json!({
            "name": "v1.2.0",
            "message": { "content": "release notes" },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "6" })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server).await;
    session
        .create_forum_post(&ForumId::new("200").unwrap(), "v1.2.0", "release notes")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_close_is_single_shot() {
    let server = MockServer::start().await;
    let mut session = session_for(&server).await;

    session.close().await.unwrap();
    assert!(matches!(
        session.close().await,
        Err(DeliveryError::SessionClosed)
    ));
}

#[test]
fn test_truncate_respects_character_limits() {
    assert_eq!(truncate("short", 2000), "short");

    let long = "x".repeat(2100);
    assert_eq!(truncate(&long, 2000).chars().count(), 2000);

    let title = "t".repeat(150);
    assert_eq!(truncate(&title, 100).chars().count(), 100);
}
