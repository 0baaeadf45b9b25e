//! AlertActor - Delivers alerts off the scheduling path
//!
//! Dispatch must never wait for a slow or broken alert channel. Failing
//! outcomes are therefore pushed onto a bounded queue and delivered by this
//! actor, one at a time, in arrival order.
//!
//! ```text
//! Dispatch ──try_send──▶ [ bounded queue ] ──▶ AlertActor ──▶ Alerter (Slack, Discord, Webhook)
//!    │
//!    └── queue full / closed → alert dropped, counted, logged
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tracing::{debug, error, instrument, trace, warn};

use crate::alerts::Alerter;
use crate::monitors::Outcome;

use super::messages::{AlertCommand, AlertStats};

/// Default number of alerts that may wait for delivery
pub const DEFAULT_ALERT_QUEUE: usize = 64;

/// Actor that hands queued outcomes to the alerter
pub struct AlertActor {
    alerter: Arc<dyn Alerter>,

    /// Command receiver
    command_rx: mpsc::Receiver<AlertCommand>,

    delivered: Arc<AtomicU64>,
}

impl AlertActor {
    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command is received or every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting alert actor");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AlertCommand::Notify(outcome) => {
                    trace!("delivering alert for {}", outcome.target.name);
                    self.alerter.notify(&outcome).await;
                    self.delivered.fetch_add(1, Ordering::Relaxed);
                }

                AlertCommand::Shutdown { respond_to } => {
                    debug!("received shutdown command");
                    let _ = respond_to.send(());
                    break;
                }
            }
        }

        debug!("alert actor stopped");
    }
}

/// Handle for queueing alerts on the AlertActor
#[derive(Clone)]
pub struct AlertHandle {
    sender: mpsc::Sender<AlertCommand>,
    delivered: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl AlertHandle {
    /// Spawn a new alert actor with room for `capacity` pending alerts
    pub fn spawn(alerter: Arc<dyn Alerter>, capacity: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity.max(1));
        let delivered = Arc::new(AtomicU64::new(0));

        let actor = AlertActor {
            alerter,
            command_rx: cmd_rx,
            delivered: Arc::clone(&delivered),
        };

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            delivered,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue an alert without waiting.
    ///
    /// Returns `false` when the alert had to be dropped.
    pub fn notify(&self, outcome: Outcome) -> bool {
        match self.sender.try_send(AlertCommand::Notify(outcome)) {
            Ok(()) => true,
            Err(TrySendError::Full(AlertCommand::Notify(outcome))) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "alert queue full, dropping alert for {}",
                    outcome.target.name
                );
                false
            }
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("alert queue full, dropping alert");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!("alert actor is not running, dropping alert");
                false
            }
        }
    }

    pub fn stats(&self) -> AlertStats {
        AlertStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    /// Shut down the alert actor after it delivered everything already queued
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self
            .sender
            .send(AlertCommand::Shutdown { respond_to: tx })
            .await
            .is_err()
        {
            return;
        }
        let _ = rx.await;
    }

    /// Like [`AlertHandle::shutdown`], but gives up after `grace`.
    ///
    /// Returns `false` when queued alerts were still pending at the deadline.
    pub async fn shutdown_within(&self, grace: Duration) -> bool {
        match tokio::time::timeout(grace, self.shutdown()).await {
            Ok(()) => true,
            Err(_) => {
                warn!("alert queue did not drain within {grace:?}, abandoning it");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
