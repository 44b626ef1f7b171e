//! Telegram Bot API Contract Tests
//!
//! These tests verify exact HTTP format compliance for the Bot API client.
//! Focus: request shape (token-scoped paths, JSON bodies, multipart fields),
//! `{ok, result, description}` envelope handling, and error mapping.

use drivecast::error::DeliveryError;
use drivecast::telegram::TelegramClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ────────────────────────────────────────────────────────────────────────────
// Request Format Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_me_uses_token_scoped_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bot123:abc/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "id": 7,
                "is_bot": true,
                "first_name": "Drivecast",
                "username": "drivecast_bot"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    let me = client
        .get_me()
        .await
        .unwrap_or_else(|e| panic!("getMe should succeed: {e}"));

    assert_eq!(me.id, 7);
    assert_eq!(me.username.as_deref(), Some("drivecast_bot"));
}

#[tokio::test]
async fn test_get_updates_sends_offset_and_poll_timeout() {
    let mock_server = MockServer::start().await;

    // The offset confirms all earlier updates; the timeout arms the long poll.
    Mock::given(method("POST"))
        .and(path("/bot123:abc/getUpdates"))
        .and(body_partial_json(json!({"offset": 88, "timeout": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    let updates = client
        .get_updates(88)
        .await
        .unwrap_or_else(|e| panic!("getUpdates should succeed: {e}"));

    assert!(updates.is_empty(), "expired poll should yield no updates");
}

#[tokio::test]
async fn test_get_updates_tolerates_extreme_poll_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Adding the HTTP margin on top of u64::MAX must not overflow the
    // request timeout; the poll still goes out and parses.
    let client = TelegramClient::new("123:abc", u64::MAX).with_base_url(mock_server.uri());
    let updates = client
        .get_updates(0)
        .await
        .unwrap_or_else(|e| panic!("getUpdates should succeed: {e}"));

    assert!(updates.is_empty());
}

#[tokio::test]
async fn test_send_message_posts_chat_id_and_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": -100_123,
            "text": "Main chat ID updated successfully!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 9, "chat": {"id": -100_123}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    let result = client
        .send_message(-100_123, "Main chat ID updated successfully!")
        .await;

    assert!(result.is_ok(), "sendMessage should succeed: {result:?}");
}

#[tokio::test]
async fn test_send_document_uploads_multipart_form() {
    let mock_server = MockServer::start().await;

    // Multipart body carries the chat as a text field and the file bytes as
    // a part named "document" with the configured file name.
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendDocument"))
        .and(body_string_contains("name=\"chat_id\""))
        .and(body_string_contains("name=\"document\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("attached document bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 10, "chat": {"id": 42}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    let result = client
        .send_document(42, "report.pdf", b"attached document bytes".to_vec())
        .await;

    assert!(result.is_ok(), "sendDocument should succeed: {result:?}");
}

// ────────────────────────────────────────────────────────────────────────────
// Response Parsing Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_updates_parses_messages_and_skips_gaps() {
    let mock_server = MockServer::start().await;

    // A text message followed by a non-message update (an edit).
    Mock::given(method("POST"))
        .and(path("/bot123:abc/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {
                    "update_id": 500,
                    "message": {
                        "message_id": 1,
                        "date": 1_724_400_000,
                        "chat": {"id": 42, "type": "private"},
                        "text": "hello"
                    }
                },
                {
                    "update_id": 501,
                    "edited_message": {"message_id": 1}
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    let updates = client
        .get_updates(0)
        .await
        .unwrap_or_else(|e| panic!("getUpdates should succeed: {e}"));

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 500);
    let message = updates[0]
        .message
        .as_ref()
        .unwrap_or_else(|| panic!("first update should carry a message"));
    assert_eq!(message.chat.id, 42);
    assert_eq!(message.text.as_deref(), Some("hello"));
    assert!(updates[1].message.is_none(), "edit has no message payload");
}

// ────────────────────────────────────────────────────────────────────────────
// Error Mapping Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_rejection_surfaces_description() {
    let mock_server = MockServer::start().await;

    // A 200 with ok:false is still a failure; the description explains it.
    Mock::given(method("GET"))
        .and(path("/botbad:token/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("bad:token", 2).with_base_url(mock_server.uri());
    match client.get_me().await {
        Err(DeliveryError::Telegram(msg)) => {
            assert!(msg.contains("Unauthorized"), "got: {msg}");
            assert!(msg.contains("getMe"), "got: {msg}");
        }
        other => panic!("expected Telegram error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_surfaces_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bot123:abc/getMe"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "ok": false,
            "error_code": 404,
            "description": "Not Found"
        })))
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    match client.get_me().await {
        Err(DeliveryError::Telegram(msg)) => {
            assert!(msg.contains("Not Found"), "got: {msg}");
        }
        other => panic!("expected Telegram error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_ok_without_result_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bot123:abc/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = TelegramClient::new("123:abc", 2).with_base_url(mock_server.uri());
    match client.get_me().await {
        Err(DeliveryError::Telegram(msg)) => {
            assert!(msg.contains("no result"), "got: {msg}");
        }
        other => panic!("expected Telegram error, got: {other:?}"),
    }
}
