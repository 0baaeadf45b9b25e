use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use uptime_monitoring::{
    Monitor, MonitorSettings,
    actors::alert::{AlertHandle, DEFAULT_ALERT_QUEUE},
    alerts::AlertManager,
    config::read_config_file,
    metrics::UptimeMetrics,
};

/// Extra time granted on shutdown on top of the probe timeout
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// How long queued alerts may take to go out on shutdown
const ALERT_DRAIN_GRACE: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short, long, env = "UPTIMER_CONFIG", default_value = "config.json")]
    file: String,

    /// Log level for the monitor
    #[arg(long, default_value_t = LevelFilter::TRACE)]
    log_level: LevelFilter,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new().with_targets(vec![
        ("uptime_monitoring", level),
        ("uptimer", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;
    let settings = MonitorSettings::from(&config.monitoring);

    let metrics = Arc::new(UptimeMetrics::new());
    let alerts = AlertHandle::spawn(
        Arc::new(AlertManager::new(config.alerts.clone())?),
        DEFAULT_ALERT_QUEUE,
    );
    let monitor = Arc::new(Monitor::new(
        settings,
        config.targets.clone(),
        alerts.clone(),
        metrics.clone(),
    )?);

    let token = CancellationToken::new();
    let mut handle = Arc::clone(&monitor).spawn(token.clone());

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("failed to listen for shutdown signal: {e}");
            }
            info!("received shutdown signal, stopping...");
        }
        result = &mut handle => {
            if let Err(e) = result {
                error!("monitor task failed: {e}");
            }
        }
    }

    token.cancel();

    let grace = settings.timeout + SHUTDOWN_GRACE;
    if !handle.is_finished() {
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("monitor task failed: {e}"),
            Err(_) => warn!("in-flight round did not finish within {grace:?}, abandoning it"),
        }
    }

    alerts.shutdown_within(ALERT_DRAIN_GRACE).await;

    let health = monitor.health().await;
    info!(
        "final status: {} ({}/{} up, {:.1}%)",
        health.status, health.up_count, health.total_count, health.uptime_percent
    );
    match metrics.snapshot() {
        Ok(snapshot) => {
            for (name, target) in snapshot {
                info!(
                    "{name}: {} checks, {} errors",
                    target.checks_total, target.errors_total
                );
            }
        }
        Err(e) => error!("failed to read metrics: {e:#}"),
    }
    let stats = alerts.stats();
    info!("alerts: {} delivered, {} dropped", stats.delivered, stats.dropped);

    info!("uptimer stopped");
    Ok(())
}
