//! Integration tests for single probes
//!
//! These tests verify that:
//! - Matching status codes produce UP outcomes
//! - Mismatching status codes produce DOWN outcomes with a descriptive error
//! - Timeouts produce DOWN outcomes with status 0
//! - The configured method and client header are sent

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use uptime_monitoring::Target;
use uptime_monitoring::config::HttpMethod;
use uptime_monitoring::monitors::{CLIENT_IDENTIFIER, Prober};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_probe_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("user-agent", CLIENT_IDENTIFIER))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prober = Prober::new(Duration::from_secs(5)).unwrap();
    let target = Arc::new(Target::new("svc", format!("{}/health", mock_server.uri())));

    let before = chrono::Utc::now();
    let outcome = prober.probe(&target).await;

    assert!(outcome.success);
    assert_eq!(outcome.status_code, 200);
    assert_eq!(outcome.error, "");
    assert_eq!(outcome.target, target);
    assert!(outcome.timestamp >= before);
    assert!(outcome.response_time < Duration::from_secs(5));
}

#[tokio::test]
async fn test_probe_unexpected_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let prober = Prober::new(Duration::from_secs(5)).unwrap();
    let target = Arc::new(Target::new("svc", format!("{}/", mock_server.uri())));

    let outcome = prober.probe(&target).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status_code, 503);
    assert_eq!(outcome.error, "unexpected status code: got 503, expected 200");
}

#[tokio::test]
async fn test_probe_uses_configured_method_and_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prober = Prober::new(Duration::from_secs(5)).unwrap();
    let target = Arc::new(
        Target::new("ping", format!("{}/ping", mock_server.uri()))
            .with_method(HttpMethod::Head)
            .with_expected_status(204),
    );

    let outcome = prober.probe(&target).await;

    assert!(outcome.success);
    assert_eq!(outcome.status_code, 204);
}

#[tokio::test]
async fn test_probe_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_string("Slow response"),
        )
        .mount(&mock_server)
        .await;

    let timeout = Duration::from_secs(1);
    let prober = Prober::new(timeout).unwrap();
    let target = Arc::new(Target::new("slow", format!("{}/slow", mock_server.uri())));

    let outcome = prober.probe(&target).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status_code, 0);
    assert!(outcome.error.contains("timeout"), "error: {}", outcome.error);
    assert!(outcome.response_time >= Duration::from_millis(900));
    assert!(outcome.response_time < Duration::from_millis(2500));
}
