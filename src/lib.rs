//! HTTP uptime monitoring engine
//!
//! Probes a fixed set of HTTP targets on an interval, keeps a bounded
//! in-memory history per target and reports every outcome to metrics and
//! every failure to the configured alert channels.

pub mod actors;
pub mod alerts;
pub mod config;
pub mod discord;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod monitors;
pub mod slack;

pub use config::{Config, Target};
pub use engine::{HealthStatus, HealthSummary, Monitor, MonitorSettings, MonitorState};
pub use history::{HISTORY_CAPACITY, HistoryStore};
pub use monitors::Outcome;
