//! `mini serve <agent>`: host one agent on its socket until signalled.

use color_eyre::eyre::{eyre, Result, WrapErr};
use mini_core::agents::{Agent, AgentFactory, AgentKind, LocalAgent};
use mini_core::logging;
use mini_core::supervisor::SupervisorActions;
use mini_core::transport::AgentService;
use mini_protocol::MiniConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

pub async fn serve(config: &MiniConfig, agent: &str) -> Result<()> {
    let kind = AgentKind::from_name(agent).ok_or_else(|| eyre!("❌ Agent '{agent}' not found"))?;
    let endpoints = AgentFactory::endpoints(config);
    let service = endpoints.resolve(agent)?.to_string();
    let socket = endpoints.socket_path(&service);

    let log_file = logging::init_file(&config.logs_path, agent)
        .wrap_err_with(|| format!("cannot open the log file for '{agent}'"))?;
    tracing::info!(agent, service = %service, log = %log_file.display(), "starting agent service");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut watchdog = None;

    let hosted: Arc<dyn Agent> = match kind {
        AgentKind::Supervisor => {
            let supervisor =
                Arc::new(AgentFactory::supervisor(config, None).map_err(|err| eyre!("{err:#}"))?);
            let interval = Duration::from_secs(config.supervisor_interval_secs);
            let watcher = Arc::clone(&supervisor);
            let shutdown = shutdown_rx.clone();
            watchdog = Some(tokio::spawn(async move {
                watcher.watch(interval, shutdown).await;
            }));
            Arc::new(LocalAgent::new(agent, SupervisorActions::new(supervisor)))
        }
        other => AgentFactory::create_local(other, config, None).map_err(|err| eyre!("{err:#}"))?,
    };

    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let served = AgentService::new(hosted, socket).run(shutdown_rx).await;
    if let Some(watchdog) = watchdog {
        watchdog.abort();
    }
    served.map_err(|err| eyre!("{err:#}"))
}

async fn wait_for_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            tracing::warn!(error = %err, "cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
