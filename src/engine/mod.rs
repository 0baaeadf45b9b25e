//! Monitoring engine
//!
//! The [`Monitor`] owns the probe schedule. Each round probes every target
//! concurrently, one task per target, and routes each outcome through the
//! [`Dispatcher`] as soon as that target's probe finishes.
//!
//! ## Scheduling
//!
//! ```text
//! start ─▶ round ─▶ wait(interval | cancel) ─▶ round ─▶ ... ─▶ cancel ─▶ Stopped
//!            │
//!            ├─ spawn probe(T1) ─▶ dispatch
//!            ├─ spawn probe(T2) ─▶ dispatch
//!            └─ join all
//! ```
//!
//! A round is always joined before the next one may start, so two probes for
//! the same target never overlap. A round that outlasts the interval is
//! followed immediately by the next one; missed ticks are neither queued nor
//! replayed. Cancellation is observed between rounds only: a round that has
//! started always runs to completion.

pub mod dispatch;
pub mod health;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::actors::alert::AlertHandle;
use crate::config::{MonitoringConfig, Target};
use crate::history::HistoryStore;
use crate::metrics::MetricsSink;
use crate::monitors::{Outcome, Prober};

pub use dispatch::Dispatcher;
pub use health::{HealthStatus, HealthSummary};

/// Lifecycle of a [`Monitor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Running,
    /// Cancellation requested, the current round is still finishing
    Stopping,
    Stopped,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Running => write!(f, "running"),
            MonitorState::Stopping => write!(f, "stopping"),
            MonitorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Timing knobs of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub history_size: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        MonitorSettings::from(&MonitoringConfig::default())
    }
}

impl From<&MonitoringConfig> for MonitorSettings {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
            history_size: config.history_size,
        }
    }
}

/// Result of one probe round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub probed: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

pub struct Monitor {
    targets: Vec<Arc<Target>>,
    settings: MonitorSettings,
    prober: Prober,
    history: HistoryStore,
    dispatcher: Dispatcher,
    state: Arc<RwLock<MonitorState>>,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        targets: Vec<Target>,
        alerts: AlertHandle,
        metrics: Arc<dyn MetricsSink>,
    ) -> anyhow::Result<Self> {
        if targets.is_empty() {
            bail!("at least one target must be configured");
        }
        if settings.interval.is_zero() {
            bail!("monitoring interval must be positive");
        }
        if settings.timeout.is_zero() {
            bail!("monitoring timeout must be positive");
        }

        let prober = Prober::new(settings.timeout).context("failed to create prober")?;
        let history = HistoryStore::with_capacity(settings.history_size);
        let dispatcher = Dispatcher::new(history.clone(), alerts, metrics);

        Ok(Self {
            targets: targets.into_iter().map(Arc::new).collect(),
            settings,
            prober,
            history,
            dispatcher,
            state: Arc::new(RwLock::new(MonitorState::Idle)),
        })
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn targets(&self) -> &[Arc<Target>] {
        &self.targets
    }

    pub async fn state(&self) -> MonitorState {
        *self.state.read().await
    }

    /// Run rounds until `token` is cancelled.
    ///
    /// The first round starts right away. Returns once the round in flight
    /// at cancellation time has finished. A monitor runs at most once.
    #[instrument(skip_all)]
    pub async fn start(&self, token: CancellationToken) {
        {
            let mut state = self.state.write().await;
            if *state != MonitorState::Idle {
                warn!("monitor is {}, refusing to start again", *state);
                return;
            }
            *state = MonitorState::Running;
        }

        info!(
            "monitoring {} targets every {:?} (timeout {:?})",
            self.targets.len(),
            self.settings.interval,
            self.settings.timeout
        );

        tokio::spawn(watch_cancellation(token.clone(), Arc::clone(&self.state)));

        if !token.is_cancelled() {
            self.run_round().await;
        }

        let mut ticker = interval_at(
            Instant::now() + self.settings.interval,
            self.settings.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                _ = ticker.tick() => {
                    if token.is_cancelled() {
                        break;
                    }
                    self.run_round().await;
                }
            }
        }

        *self.state.write().await = MonitorState::Stopped;
        info!("monitor stopped");
    }

    /// Spawn [`Monitor::start`] on the runtime.
    pub fn spawn(self: Arc<Self>, token: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.start(token).await })
    }

    /// Probe every target once and wait for all of them.
    ///
    /// Probes launch in configured order and finish in any order; each
    /// outcome is dispatched by its own task as soon as it is known.
    pub async fn run_round(&self) -> RoundSummary {
        let started = Instant::now();

        let mut handles = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let target = Arc::clone(target);
            let prober = self.prober.clone();
            let dispatcher = self.dispatcher.clone();

            handles.push(tokio::spawn(async move {
                let outcome = prober.probe(&target).await;
                let success = outcome.success;
                dispatcher.dispatch(outcome).await;
                success
            }));
        }

        let mut failures = 0;
        for handle in handles {
            match handle.await {
                Ok(true) => {}
                Ok(false) => failures += 1,
                Err(e) => {
                    failures += 1;
                    error!("probe task failed: {e}");
                }
            }
        }

        let summary = RoundSummary {
            probed: self.targets.len(),
            failures,
            elapsed: started.elapsed(),
        };
        debug!(
            "round finished: {}/{} up in {:?}",
            summary.probed - summary.failures,
            summary.probed,
            summary.elapsed
        );
        summary
    }

    /// Deep copy of all recorded outcomes, oldest first per target.
    pub async fn history(&self) -> HashMap<String, Vec<Outcome>> {
        self.history.snapshot_all().await
    }

    /// Latest outcome per target that has been probed at least once.
    pub async fn latest(&self) -> HashMap<String, Outcome> {
        self.history.snapshot_latest().await
    }

    pub async fn target_history(&self, target_name: &str) -> Option<Vec<Outcome>> {
        self.history.snapshot_target(target_name).await
    }

    pub async fn health(&self) -> HealthSummary {
        HealthSummary::from_latest(&self.latest().await)
    }
}

async fn watch_cancellation(token: CancellationToken, state: Arc<RwLock<MonitorState>>) {
    token.cancelled().await;

    let mut state = state.write().await;
    if *state == MonitorState::Running {
        debug!("cancellation requested, finishing current round");
        *state = MonitorState::Stopping;
    }
}
