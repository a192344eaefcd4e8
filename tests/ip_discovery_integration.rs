// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for HTTP public IP discovery using wiremock

use ddns_operator::errors::IpDiscoveryError;
use ddns_operator::network::{HttpPublicIpSource, PublicIpSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn answering(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_preferred_url_is_used_first() {
    let server = MockServer::start().await;
    answering(&server, "/custom", 200, "198.51.100.23\n").await;
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_string("192.0.2.1"))
        .expect(0)
        .mount(&server)
        .await;

    let source = HttpPublicIpSource::with_pool(vec![format!("{}/pool", server.uri())])
        .expect("valid source");

    let ip = source
        .public_ip(Some(&format!("{}/custom", server.uri())))
        .await
        .expect("should discover IP");

    assert_eq!(ip, "198.51.100.23");
}

#[tokio::test]
async fn test_invalid_body_falls_through() {
    let server = MockServer::start().await;
    answering(&server, "/custom", 200, "<html>rate limited</html>").await;
    answering(&server, "/pool", 200, "192.0.2.77").await;

    let source = HttpPublicIpSource::with_pool(vec![format!("{}/pool", server.uri())])
        .expect("valid source");

    let ip = source
        .public_ip(Some(&format!("{}/custom", server.uri())))
        .await
        .expect("should discover IP");

    assert_eq!(ip, "192.0.2.77");
}

#[tokio::test]
async fn test_error_status_falls_through() {
    let server = MockServer::start().await;
    answering(&server, "/down", 503, "").await;
    answering(&server, "/up", 200, "2001:db8::1").await;

    let source = HttpPublicIpSource::with_pool(vec![format!("{}/up", server.uri())])
        .expect("valid source");

    let ip = source
        .public_ip(Some(&format!("{}/down", server.uri())))
        .await
        .expect("should discover IP");

    assert_eq!(ip, "2001:db8::1");
}

#[tokio::test]
async fn test_invalid_preferred_url_is_ignored() {
    let server = MockServer::start().await;
    answering(&server, "/pool", 200, "192.0.2.5").await;

    let source = HttpPublicIpSource::with_pool(vec![format!("{}/pool", server.uri())])
        .expect("valid source");

    let ip = source
        .public_ip(Some("not a url"))
        .await
        .expect("should discover IP");

    assert_eq!(ip, "192.0.2.5");
}

#[tokio::test]
async fn test_exhausted_pool() {
    let server = MockServer::start().await;
    answering(&server, "/a", 500, "").await;
    answering(&server, "/b", 200, "nope").await;

    let source = HttpPublicIpSource::with_pool(vec![
        format!("{}/a", server.uri()),
        format!("{}/b", server.uri()),
    ])
    .expect("valid source");

    let err = source.public_ip(None).await.unwrap_err();

    assert!(matches!(err, IpDiscoveryError::Exhausted));
    assert_eq!(
        err.to_string(),
        "could not retrieve a response from any of the providers"
    );
}
