// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use convo::error::{ApiError, ConvoError};
use convo::llm::retry::RetryConfig;
use convo::llm::{ChatCompletionsResponder, Responder, NO_RESPONSE};

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
        jitter: 0.0,
    }
}

fn responder_for(server: &MockServer) -> ChatCompletionsResponder {
    ChatCompletionsResponder::new("test-key", "test-model")
        .with_base_url(format!("{}/v1/chat/completions", server.uri()))
        .with_retry_config(fast_retry())
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_respond_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello there!")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = responder_for(&server).respond("User: hi\nAgent:").await.unwrap();
    assert_eq!(reply, "Hello there!");
}

#[tokio::test]
async fn test_system_prompt_is_sent_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "You are Convo."},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = responder_for(&server)
        .with_system_prompt("You are Convo.")
        .respond("hi")
        .await
        .unwrap();
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn test_empty_content_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let reply = responder_for(&server).respond("hi").await.unwrap();
    assert_eq!(reply, NO_RESPONSE);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_json(json!({
                    "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
                })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("after wait")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = responder_for(&server).respond("hi").await.unwrap();
    assert_eq!(reply, "after wait");
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "code": "invalid_api_key"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = responder_for(&server).respond("hi").await.unwrap_err();
    assert!(matches!(err, ConvoError::Api(ApiError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let err = responder_for(&server).respond("hi").await.unwrap_err();
    match err {
        ConvoError::Api(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "The model `nope` does not exist", "code": "model_not_found"}
        })))
        .mount(&server)
        .await;

    let err = responder_for(&server).respond("hi").await.unwrap_err();
    assert!(matches!(err, ConvoError::Api(ApiError::ModelNotFound(_))));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = responder_for(&server)
        .with_retry_config(RetryConfig::none())
        .respond("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoError::Api(ApiError::InvalidResponse(_))));
}
