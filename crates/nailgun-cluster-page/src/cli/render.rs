/*
[INPUT]:  PageSnapshot, PageNotification
[OUTPUT]: Styled terminal output
[POS]:    CLI layer - snapshot printing
[UPDATE]: When page snapshot fields change
*/

use console::style;

use nailgun_adapter::TaskStatus;
use nailgun_cluster_page::PageNotification;
use nailgun_cluster_page::PageSnapshot;
use nailgun_cluster_page::view::{
    ContrailSnapshot, DeploymentControlSnapshot, DeploymentResultSnapshot, TabSnapshot,
};

const BAR_CELLS: usize = 30;

pub fn print_snapshot(snapshot: &PageSnapshot) {
    println!();
    println!(
        "{} {} {}",
        style(format!("#{}", snapshot.cluster_id)).dim(),
        style(&snapshot.title).bold().cyan(),
        style(format!("[{}]", snapshot.cluster_status)).yellow()
    );
    let tabs: Vec<String> = snapshot
        .tabs
        .iter()
        .map(|kind| {
            if *kind == snapshot.active_tab {
                style(format!("[{kind}]")).bold().to_string()
            } else {
                kind.to_string()
            }
        })
        .collect();
    println!("  {}", tabs.join(" "));

    if let Some(message) = snapshot.customization_message {
        println!("  {}", style(message).yellow());
    }
    if let Some(result) = &snapshot.deployment_result {
        print_result(result);
    }
    print_control(&snapshot.deployment_control);
    print_tab(&snapshot.tab);
}

fn print_result(result: &DeploymentResultSnapshot) {
    let heading = format!("{} #{} {}", result.task_name, result.task_id, result.status);
    let heading = if result.status == TaskStatus::Error {
        style(heading).red().bold()
    } else {
        style(heading).green().bold()
    };
    match &result.message {
        Some(message) => println!("  {heading}: {message}"),
        None => println!("  {heading}"),
    }
}

fn print_control(control: &DeploymentControlSnapshot) {
    match control {
        DeploymentControlSnapshot::InProgress {
            task_id,
            task_name,
            progress,
            stoppable,
        } => {
            let filled = usize::from(progress.bar_width) * BAR_CELLS / 100;
            println!(
                "  {} #{} [{}{}] {}{}",
                style(task_name).bold(),
                task_id,
                style("#".repeat(filled)).green(),
                " ".repeat(BAR_CELLS - filled),
                progress.text(),
                if *stoppable { style(" (stoppable)").dim().to_string() } else { String::new() }
            );
        }
        DeploymentControlSnapshot::Idle {
            changes,
            deploy_enabled,
            release_state,
        } => {
            if changes.is_empty() {
                println!("  {}", style("No pending changes").dim());
            } else {
                for change in changes {
                    println!("  {} {}", style("*").yellow(), change);
                }
            }
            let deploy = if *deploy_enabled {
                style("deploy available").green()
            } else {
                style("deploy unavailable").dim()
            };
            match release_state {
                Some(state) => println!("  {deploy} (release {state:?})"),
                None => println!("  {deploy}"),
            }
        }
    }
}

fn print_tab(tab: &TabSnapshot) {
    match tab {
        TabSnapshot::Nodes(rows) => {
            if rows.is_empty() {
                println!("  {}", style("No nodes").dim());
            }
            for row in rows {
                let online = if row.online { style("online").green() } else { style("offline").red() };
                let pending = row.pending.map(|p| format!(" ({p})")).unwrap_or_default();
                println!(
                    "  {:>4} {:<24} {:<14} {}{}",
                    row.id,
                    row.name,
                    format!("{:?}", row.status),
                    online,
                    style(pending).yellow()
                );
            }
        }
        TabSnapshot::Contrail(contrail) => print_contrail(contrail),
        TabSnapshot::Passive(kind) => println!("  {}", style(format!("{kind} tab")).dim()),
    }
}

pub fn print_contrail(contrail: &ContrailSnapshot) {
    if !contrail.loaded {
        println!("  {}", style("Contrail settings not loaded").dim());
        return;
    }
    if contrail.locked {
        println!("  {}", style("Settings locked while the cluster is deployed").yellow());
    }
    if let Some(as_number) = contrail.as_number {
        println!("  AS number: {}", style(as_number).bold());
    }
    if contrail.gateways.is_empty() {
        println!("  {}", style("No WAN gateways").dim());
    }
    for (index, gateway) in contrail.gateways.iter().enumerate() {
        println!("  {index:>2}. {:<32} {}", gateway.hostname, gateway.ip);
    }
}

pub fn print_notification(notification: &PageNotification) {
    match notification {
        PageNotification::NavbarRefresh => {}
        PageNotification::DeploymentFinished { task_id, status } => println!(
            "{} deployment task #{} finished: {}",
            style("==>").cyan().bold(),
            task_id,
            status
        ),
        PageNotification::SetupFinished { task_id, status } => println!(
            "{} release setup task #{} finished: {}",
            style("==>").cyan().bold(),
            task_id,
            status
        ),
    }
}
