//! Per-target check metrics
//!
//! The engine reports every outcome to a [`MetricsSink`]. [`UptimeMetrics`]
//! is the in-process implementation: one set of gauges and counters per
//! target, readable through copying snapshots.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use serde::Serialize;

use crate::monitors::Outcome;

/// Receives every probe outcome.
///
/// Called synchronously from dispatch, so implementations must return
/// quickly. Errors are logged by the caller and otherwise ignored.
pub trait MetricsSink: Send + Sync {
    fn record(&self, outcome: &Outcome) -> anyhow::Result<()>;
}

/// Gauges and counters of a single target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetMetrics {
    pub url: String,

    /// 1 when the last check succeeded, 0 otherwise
    pub up: u8,

    pub last_response_time_seconds: f64,

    pub checks_total: u64,

    pub errors_total: u64,
}

#[derive(Debug, Default)]
pub struct UptimeMetrics {
    targets: Mutex<HashMap<String, TargetMetrics>>,
}

impl UptimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> anyhow::Result<HashMap<String, TargetMetrics>> {
        let targets = self
            .targets
            .lock()
            .map_err(|_| anyhow!("metrics registry lock poisoned"))?;
        Ok(targets.clone())
    }

    pub fn get(&self, target_name: &str) -> anyhow::Result<Option<TargetMetrics>> {
        let targets = self
            .targets
            .lock()
            .map_err(|_| anyhow!("metrics registry lock poisoned"))?;
        Ok(targets.get(target_name).cloned())
    }
}

impl MetricsSink for UptimeMetrics {
    fn record(&self, outcome: &Outcome) -> anyhow::Result<()> {
        let mut targets = self
            .targets
            .lock()
            .map_err(|_| anyhow!("metrics registry lock poisoned"))?;

        let metrics = targets
            .entry(outcome.target.name.clone())
            .or_insert_with(|| TargetMetrics {
                url: outcome.target.url.clone(),
                ..Default::default()
            });

        if outcome.success {
            metrics.up = 1;
        } else {
            metrics.up = 0;
            metrics.errors_total += 1;
        }
        metrics.last_response_time_seconds = outcome.response_time.as_secs_f64();
        metrics.checks_total += 1;

        Ok(())
    }
}
