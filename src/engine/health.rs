use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::monitors::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every recorded target is up
    Healthy,
    /// Some targets are down
    Degraded,
    /// No recorded target is up
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Fleet-wide view over the latest outcome of every target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub up_count: usize,
    pub total_count: usize,
    pub uptime_percent: f64,
    pub timestamp: DateTime<Utc>,
}

impl HealthSummary {
    pub fn from_latest(latest: &HashMap<String, Outcome>) -> Self {
        let total_count = latest.len();
        let up_count = latest.values().filter(|outcome| outcome.success).count();

        let status = if up_count == total_count {
            HealthStatus::Healthy
        } else if up_count == 0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        let uptime_percent = if total_count == 0 {
            0.0
        } else {
            up_count as f64 / total_count as f64 * 100.0
        };

        Self {
            status,
            up_count,
            total_count,
            uptime_percent,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
