/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Cluster page commands run against a Nailgun API with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use nailgun_adapter::{ClusterApi, NailgunClient};
use nailgun_cluster_page::{Dialogs, PageConfig, PageOptions};

use cli::dialogs::TerminalDialogs;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config_path = resolve_config_path(args.config_path.clone())?;

    if let Command::Init { output, force } = &args.command {
        let output = output.clone().unwrap_or(config_path);
        return cli::init::run_init(&output, *force);
    }

    let config = PageConfig::from_file(&config_path).context("load config")?;
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    let _log_guard = init_tracing(log_level, config.log.file.as_deref())?;

    info!(
        config_path = %config_path.display(),
        base_url = %config.api.base_url,
        "starting nailgun-cluster-page"
    );

    let cluster_id = args
        .cluster_id
        .or(config.cluster_id)
        .context("no cluster selected: pass --cluster-id or set cluster_id in the config")?;

    let mut client = NailgunClient::with_config_and_base_url(config.client_config(), &config.api.base_url)
        .context("create Nailgun client")?;
    if let Some(token) = &config.api.auth_token {
        client.set_auth_token(token.clone());
    }
    let api: Arc<dyn ClusterApi> = Arc::new(client);
    let dialogs: Arc<dyn Dialogs> = Arc::new(TerminalDialogs::new(args.assume_yes));

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let options = PageOptions {
        update_interval: config.update_interval(),
        active_tab: args.command.initial_tab(),
    };
    cli::commands::run(args.command, api, dialogs, cluster_id, options, shutdown).await?;
    info!("cluster page closed");
    Ok(())
}

fn resolve_config_path(path: Option<PathBuf>) -> Result<PathBuf> {
    path.or_else(PageConfig::default_path)
        .context("no config directory on this platform: pass --config")
}

/// Logs go to stderr, and additionally to `file` when configured
fn init_tracing(log_level: &str, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let (file_layer, guard) = match file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("log.file must name a file")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
