use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::config::Target;

/// The recorded result of a single probe attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub target: Arc<Target>,
    pub success: bool,

    /// HTTP status code, 0 when no response was received
    pub status_code: u16,

    #[serde(rename = "response_time_ms", serialize_with = "as_millis")]
    pub response_time: Duration,

    /// Empty on success
    pub error: String,

    /// When the probe was started
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    pub fn up(
        target: Arc<Target>,
        status_code: u16,
        response_time: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            target,
            success: true,
            status_code,
            response_time,
            error: String::new(),
            timestamp,
        }
    }

    pub fn down(
        target: Arc<Target>,
        status_code: u16,
        response_time: Duration,
        error: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            target,
            success: false,
            status_code,
            response_time,
            error: error.into(),
            timestamp,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target.name
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
