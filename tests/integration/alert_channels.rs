//! Integration tests for alert channels
//!
//! These tests verify that:
//! - Every configured channel receives the failing outcome
//! - A broken channel does not prevent delivery to the others
//! - Alerts flow from a failing probe through the alert actor to a webhook

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uptime_monitoring::{
    Monitor, Outcome, Target,
    actors::alert::AlertHandle,
    alerts::{AlertManager, Alerter},
    config::{Alert, Discord, Slack, Webhook},
    metrics::{MetricsSink, UptimeMetrics},
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

fn failing_outcome() -> Outcome {
    Outcome::down(
        Arc::new(Target::new("svc", "http://svc.internal/")),
        503,
        Duration::from_millis(120),
        "unexpected status code: got 503, expected 200",
        chrono::Utc::now(),
    )
}

#[tokio::test]
async fn test_all_channels_receive_alert() {
    let hooks = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/slack"))
        .and(body_partial_json(json!({
            "channel": "#ops",
            "text": "🚨 ALERT: svc is DOWN",
            "attachments": [{ "color": "danger" }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&hooks)
        .await;

    Mock::given(method("POST"))
        .and(path("/discord"))
        .and(body_partial_json(json!({ "content": "🔴 Target: `svc` <@42>" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&hooks)
        .await;

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_partial_json(json!({
            "target": "svc",
            "url": "http://svc.internal/",
            "status_code": 503,
            "error": "unexpected status code: got 503, expected 200",
            "response_time_ms": 120
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&hooks)
        .await;

    let manager = AlertManager::new(vec![
        Alert::Slack(Slack {
            webhook_url: format!("{}/slack", hooks.uri()),
            channel: Some("#ops".to_string()),
        }),
        Alert::Discord(Discord {
            url: format!("{}/discord", hooks.uri()),
            user_id: Some("42".to_string()),
        }),
        Alert::Webhook(Webhook {
            url: format!("{}/webhook", hooks.uri()),
        }),
    ])
    .unwrap();

    manager.notify(&failing_outcome()).await;

    hooks.verify().await;
}

#[tokio::test]
async fn test_broken_channel_does_not_block_others() {
    let hooks = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/slack"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&hooks)
        .await;

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&hooks)
        .await;

    let manager = AlertManager::new(vec![
        Alert::Slack(Slack {
            webhook_url: format!("{}/slack", hooks.uri()),
            channel: None,
        }),
        // nothing listens here
        Alert::Discord(Discord {
            url: "http://127.0.0.1:9/discord".to_string(),
            user_id: None,
        }),
        Alert::Webhook(Webhook {
            url: format!("{}/webhook", hooks.uri()),
        }),
    ])
    .unwrap();

    manager.notify(&failing_outcome()).await;

    hooks.verify().await;
}

#[tokio::test]
async fn test_no_channels_is_a_no_op() {
    let manager = AlertManager::new(vec![]).unwrap();
    assert!(manager.channels().is_empty());
    manager.notify(&failing_outcome()).await;
}

#[tokio::test]
async fn test_failing_probe_reaches_webhook() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&service)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&service)
        .await;

    let hooks = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_partial_json(json!({ "target": "down", "status_code": 503 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&hooks)
        .await;

    let manager = AlertManager::new(vec![Alert::Webhook(Webhook {
        url: format!("{}/webhook", hooks.uri()),
    })])
    .unwrap();
    let alerts = AlertHandle::spawn(Arc::new(manager), 8);
    let metrics = Arc::new(UptimeMetrics::new());

    let monitor = Monitor::new(
        test_settings(Duration::from_secs(60), Duration::from_secs(5)),
        vec![
            target("up", format!("{}/up", service.uri())),
            target("down", format!("{}/down", service.uri())),
        ],
        alerts.clone(),
        metrics.clone(),
    )
    .unwrap();

    monitor.run_round().await;
    alerts.shutdown().await;

    hooks.verify().await;
    assert_eq!(alerts.stats().delivered, 1);

    let snapshot = metrics.snapshot().unwrap();
    assert_eq!(snapshot["up"].up, 1);
    assert_eq!(snapshot["down"].up, 0);
    assert_eq!(snapshot["down"].errors_total, 1);
    assert_eq!(snapshot["down"].checks_total, 1);

    // recording once more by hand goes through the same sink
    let latest = monitor.latest().await;
    metrics.record(&latest["down"]).unwrap();
    assert_eq!(metrics.get("down").unwrap().unwrap().checks_total, 2);
}

#[tokio::test]
async fn test_hanging_webhook_does_not_hang_shutdown() {
    let hooks = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(600)))
        .mount(&hooks)
        .await;

    let manager = AlertManager::with_timeout(
        vec![Alert::Webhook(Webhook {
            url: format!("{}/webhook", hooks.uri()),
        })],
        Duration::from_millis(300),
    )
    .unwrap();
    let alerts = AlertHandle::spawn(Arc::new(manager), 2);

    let accepted = (0..5)
        .filter(|_| alerts.notify(failing_outcome()))
        .count() as u64;

    let drained = tokio::time::timeout(
        Duration::from_secs(5),
        alerts.shutdown_within(Duration::from_secs(4)),
    )
    .await;
    assert_eq!(drained, Ok(true));

    let stats = alerts.stats();
    assert_eq!(stats.delivered, accepted);
    assert_eq!(stats.delivered + stats.dropped, 5);
}
