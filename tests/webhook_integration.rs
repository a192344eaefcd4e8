// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the webhook notifier using wiremock

use ddns_operator::errors::NotifierError;
use ddns_operator::notifiers::webhook::WebhookNotifier;
use ddns_operator::notifiers::NotificationClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_greeting_posts_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"content": "`ddns-operator` is starting its watch."})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/api/webhooks/1/abc", server.uri()))
        .expect("valid notifier");

    notifier.send_greetings().await.expect("greeting should be delivered");
}

#[tokio::test]
async fn test_notification_posts_message() {
    let server = MockServer::start().await;
    let message = "Provider IP (192.0.2.1) in sync with Public IP. From provider: (home).";

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(json!({"content": message})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/hook", server.uri())).expect("valid notifier");

    notifier
        .send_notification(message)
        .await
        .expect("notification should be delivered");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(&format!("{}/hook", server.uri())).expect("valid notifier");

    let err = notifier.send_notification("hello").await.unwrap_err();

    assert!(matches!(err, NotifierError::Rejected { status: 404, .. }));
    assert!(err.to_string().contains("Unknown Webhook"));
}
