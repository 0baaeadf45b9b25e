//! Helper functions for integration tests

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uptime_monitoring::{
    Monitor, MonitorSettings, Outcome, Target,
    actors::alert::AlertHandle,
    alerts::Alerter,
    metrics::MetricsSink,
};

/// Alerter that remembers every outcome it was asked to deliver
#[derive(Default)]
pub struct RecordingAlerter {
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingAlerter {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }
}

#[async_trait]
impl Alerter for RecordingAlerter {
    async fn notify(&self, outcome: &Outcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}

/// Metrics sink that counts calls
#[derive(Default)]
pub struct CountingMetrics {
    calls: AtomicUsize,
    outcomes: Mutex<Vec<Outcome>>,
}

impl CountingMetrics {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl MetricsSink for CountingMetrics {
    fn record(&self, outcome: &Outcome) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

/// Metrics sink that always fails
#[derive(Default)]
pub struct FailingMetrics {
    calls: AtomicUsize,
}

impl FailingMetrics {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetricsSink for FailingMetrics {
    fn record(&self, _outcome: &Outcome) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("metrics backend unavailable")
    }
}

pub fn test_settings(interval: Duration, timeout: Duration) -> MonitorSettings {
    MonitorSettings {
        interval,
        timeout,
        history_size: 100,
    }
}

pub fn target(name: &str, url: String) -> Target {
    Target::new(name, url)
}

/// Monitor wired to recording collaborators
pub struct TestMonitor {
    pub monitor: Arc<Monitor>,
    pub alerter: Arc<RecordingAlerter>,
    pub metrics: Arc<CountingMetrics>,
    pub alerts: AlertHandle,
}

pub fn create_test_monitor(settings: MonitorSettings, targets: Vec<Target>) -> TestMonitor {
    let alerter = Arc::new(RecordingAlerter::default());
    let metrics = Arc::new(CountingMetrics::default());
    let alerts = AlertHandle::spawn(alerter.clone(), 16);

    let monitor = Monitor::new(settings, targets, alerts.clone(), metrics.clone()).unwrap();

    TestMonitor {
        monitor: Arc::new(monitor),
        alerter,
        metrics,
        alerts,
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
