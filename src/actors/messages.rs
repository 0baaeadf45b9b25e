//! Message types for actor communication

use tokio::sync::oneshot;

use crate::monitors::Outcome;

/// Commands that can be sent to the AlertActor
#[derive(Debug)]
pub enum AlertCommand {
    /// Deliver an alert for a failing outcome
    Notify(Outcome),

    /// Gracefully shut down the alert actor
    ///
    /// Alerts queued before this command are still delivered.
    Shutdown { respond_to: oneshot::Sender<()> },
}

/// Delivery statistics of the alert actor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertStats {
    /// Alerts handed to the alerter
    pub delivered: u64,

    /// Alerts rejected because the queue was full or closed
    pub dropped: u64,
}
