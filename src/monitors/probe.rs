//! Single-shot HTTP probe
//!
//! A probe performs exactly one request against a target and classifies the
//! result into an [`Outcome`]. There are no retries: a target that keeps
//! failing shows up as consecutive DOWN outcomes across rounds.
//!
//! ```text
//! build request → send (bounded by timeout) → headers received → compare status
//!                        │                                          │
//!                        └── transport error → DOWN, status 0       └── mismatch → DOWN
//! ```

use std::error::Error as _;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use tracing::{info, instrument, trace, warn};

use crate::config::Target;

use super::outcome::Outcome;

/// Identifies the monitor to probed services
pub const CLIENT_IDENTIFIER: &str = "UpTimer-Monitor/1.0";

/// Why a probe did not produce a healthy outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No response headers before the deadline
    Timeout(Duration),

    /// DNS resolution or TCP/TLS connect failed
    Connect(String),

    /// Any other transport level failure
    Request(String),

    /// A response arrived with the wrong status code
    UnexpectedStatus { got: u16, expected: u16 },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout(timeout) => {
                write!(f, "timeout: no response within {timeout:?}")
            }
            ProbeError::Connect(msg) => write!(f, "connection failed: {msg}"),
            ProbeError::Request(msg) => write!(f, "request failed: {msg}"),
            ProbeError::UnexpectedStatus { got, expected } => {
                write!(f, "unexpected status code: got {got}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ProbeError {}

impl ProbeError {
    fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(timeout)
        } else if err.is_connect() {
            ProbeError::Connect(describe(&err))
        } else {
            ProbeError::Request(describe(&err))
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Executes probes with a shared HTTP client and a fixed deadline
#[derive(Debug, Clone)]
pub struct Prober {
    /// HTTP client (reused across requests, cheap to clone)
    client: reqwest::Client,

    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a target once and classify the result.
    ///
    /// Never fails: every error is folded into a DOWN outcome.
    #[instrument(skip_all, fields(target = %target.name))]
    pub async fn probe(&self, target: &Arc<Target>) -> Outcome {
        let timestamp = Utc::now();
        let start = Instant::now();

        trace!("probing {} {}", reqwest::Method::from(target.method), target.url);

        let result = self.execute(target).await;
        let response_time = start.elapsed();

        match result {
            Ok(status_code) => {
                info!(
                    "✓ {} is UP (Status: {status_code}, Time: {response_time:?})",
                    target.name
                );
                Outcome::up(Arc::clone(target), status_code, response_time, timestamp)
            }
            Err((status_code, err)) => {
                warn!("✗ {} is DOWN ({err}, Time: {response_time:?})", target.name);
                Outcome::down(
                    Arc::clone(target),
                    status_code,
                    response_time,
                    err.to_string(),
                    timestamp,
                )
            }
        }
    }

    /// Send the request and check the status.
    ///
    /// Returns the observed status code on failure alongside the error (0 when
    /// no response arrived).
    async fn execute(&self, target: &Target) -> Result<u16, (u16, ProbeError)> {
        let response = self
            .client
            .request(target.method.into(), &target.url)
            .header(USER_AGENT, CLIENT_IDENTIFIER)
            .send()
            .await
            .map_err(|e| (0, ProbeError::from_transport(e, self.timeout)))?;

        // the body is never read; dropping the response releases the connection
        let status_code = response.status().as_u16();

        if status_code == target.expected_status {
            Ok(status_code)
        } else {
            Err((
                status_code,
                ProbeError::UnexpectedStatus {
                    got: status_code,
                    expected: target.expected_status,
                },
            ))
        }
    }
}
