use std::sync::Arc;

use tracing::{error, trace};

use crate::actors::alert::AlertHandle;
use crate::history::HistoryStore;
use crate::metrics::MetricsSink;
use crate::monitors::Outcome;

/// Routes a finished outcome to history, alerting and metrics
#[derive(Clone)]
pub struct Dispatcher {
    history: HistoryStore,
    alerts: AlertHandle,
    metrics: Arc<dyn MetricsSink>,
}

impl Dispatcher {
    pub fn new(history: HistoryStore, alerts: AlertHandle, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            history,
            alerts,
            metrics,
        }
    }

    /// Never fails: collaborator errors are logged and swallowed here.
    pub async fn dispatch(&self, outcome: Outcome) {
        let name = outcome.target.name.clone();

        self.history.append(&name, outcome.clone()).await;

        if !outcome.success {
            trace!("{name}: queueing alert");
            self.alerts.notify(outcome.clone());
        }

        if let Err(e) = self.metrics.record(&outcome) {
            error!("{name}: failed to record metrics: {e:#}");
        }
    }
}
