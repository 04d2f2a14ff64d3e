/*
[INPUT]:  Parsed page command, API client, dialogs, shutdown token
[OUTPUT]: Page operations executed against a live cluster page
[POS]:    CLI layer - command dispatch
[UPDATE]: When adding page commands
*/

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use nailgun_adapter::ClusterApi;
use nailgun_cluster_page::view::TabSnapshot;
use nailgun_cluster_page::{ClusterPage, DeployOutcome, Dialogs, PageOptions, PollPhase};

use super::render;
use super::{Command, ContrailCommand};

/// How long `watch` waits before re-checking an idle page for new tasks
const IDLE_RECHECK_FACTOR: u32 = 6;

pub async fn run(
    command: Command,
    api: Arc<dyn ClusterApi>,
    dialogs: Arc<dyn Dialogs>,
    cluster_id: u64,
    options: PageOptions,
    shutdown: CancellationToken,
) -> Result<()> {
    if let Command::Init { .. } = command {
        bail!("init does not open a cluster page");
    }
    let page = ClusterPage::open(api, dialogs, cluster_id, options)
        .await
        .with_context(|| format!("open cluster {cluster_id}"))?;

    let result = match command {
        Command::Init { .. } => Ok(()),
        Command::Watch { .. } => follow(&page, &shutdown, false).await,
        Command::Deploy => deploy(&page, &shutdown).await,
        Command::Dismiss => {
            match page.dismiss_task_result().await? {
                Some(task_id) => println!("{} dismissed task #{task_id}", style("OK").green().bold()),
                None => println!("{}", style("No finished task to dismiss").dim()),
            }
            Ok(())
        }
        Command::DiscardChanges => {
            if page.discard_changes().await? {
                println!("{} pending changes discarded", style("OK").green().bold());
            }
            render::print_snapshot(&page.snapshot().await);
            Ok(())
        }
        Command::StopDeployment => {
            if page.stop_deployment().await? {
                println!("{} stop requested", style("OK").green().bold());
                follow(&page, &shutdown, true).await?;
            }
            Ok(())
        }
        Command::Contrail { action } => contrail(&page, action).await,
    };

    page.dispose().await;
    result
}

async fn deploy(page: &ClusterPage, shutdown: &CancellationToken) -> Result<()> {
    match page.on_deploy_request().await? {
        DeployOutcome::Started { task_id } => {
            println!("{} deployment task #{task_id} started", style("OK").green().bold());
            follow(page, shutdown, true).await
        }
        DeployOutcome::Cancelled => {
            println!("{}", style("Deployment cancelled").dim());
            Ok(())
        }
    }
}

/// Print every distinct snapshot and notification until interrupted.
///
/// With `until_idle` the loop also ends once polling stops.
async fn follow(page: &ClusterPage, shutdown: &CancellationToken, until_idle: bool) -> Result<()> {
    let mut snapshots = page.subscribe_snapshots();
    let mut notifications = page.subscribe_notifications();
    let mut phase = page.subscribe_poll_phase();

    let mut last = snapshots.borrow_and_update().clone();
    render::print_snapshot(&last);
    if until_idle && page.poll_phase() == PollPhase::Idle {
        return Ok(());
    }

    let mut recheck = tokio::time::interval(page.update_interval() * IDLE_RECHECK_FACTOR);
    recheck.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested, leaving cluster page");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot != last {
                    render::print_snapshot(&snapshot);
                    last = snapshot;
                }
            }
            received = notifications.recv() => match received {
                Ok(notification) => render::print_notification(&notification),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Notification stream lagged"),
                Err(RecvError::Closed) => break,
            },
            changed = phase.changed(), if until_idle => {
                if changed.is_err() || *phase.borrow_and_update() == PollPhase::Idle {
                    break;
                }
            }
            _ = recheck.tick(), if !until_idle => {
                if page.poll_phase() == PollPhase::Idle {
                    if let Err(err) = page.refresh_now().await {
                        warn!(error = %err, "Idle refresh failed");
                    }
                }
            }
        }
    }

    while let Ok(notification) = notifications.try_recv() {
        render::print_notification(&notification);
    }
    Ok(())
}

async fn contrail(page: &ClusterPage, action: ContrailCommand) -> Result<()> {
    match action {
        ContrailCommand::Show => {}
        ContrailCommand::AddGateway { hostname, ip } => {
            page.add_gateway(&hostname, &ip).await?;
            page.apply_contrail_changes().await?;
        }
        ContrailCommand::DeleteGateway { index } => {
            let removed = page.delete_gateway(index).await?;
            info!(hostname = %removed.hostname, ip = %removed.ip, "WAN gateway removed");
            page.apply_contrail_changes().await?;
        }
        ContrailCommand::SetAsNumber { as_number } => {
            page.set_as_number(as_number).await?;
            page.apply_contrail_changes().await?;
        }
        ContrailCommand::LoadDefaults => {
            page.load_contrail_defaults().await?;
            page.apply_contrail_changes().await?;
        }
    }

    match page.snapshot().await.tab {
        TabSnapshot::Contrail(contrail) => render::print_contrail(&contrail),
        other => bail!("contrail tab is not active: {other:?}"),
    }
    Ok(())
}
