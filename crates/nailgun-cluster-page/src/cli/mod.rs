/*
[INPUT]:  Command line arguments
[OUTPUT]: Parsed CLI commands
[POS]:    CLI layer - argument definitions
[UPDATE]: When adding commands or flags
*/

pub mod commands;
pub mod dialogs;
pub mod init;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nailgun_cluster_page::TabKind;

#[derive(Parser, Debug)]
#[command(
    name = "nailgun-cluster-page",
    version,
    about = "Watch and operate a Nailgun cluster deployment from the terminal"
)]
pub struct Cli {
    /// Defaults to $CONFIG_DIR/nailgun-cluster-page/config.yaml
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_path: Option<PathBuf>,
    /// Overrides log.level from the config file
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
    /// Overrides cluster_id from the config file
    #[arg(long = "cluster-id", value_name = "ID", global = true)]
    pub cluster_id: Option<u64>,
    /// Answer yes to every confirmation
    #[arg(long = "yes", short = 'y', global = true)]
    pub assume_yes: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a configuration file
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
    /// Follow the cluster page until interrupted
    Watch {
        #[arg(long, default_value = "nodes")]
        tab: TabKind,
    },
    /// Deploy pending changes and follow the deployment
    Deploy,
    /// Dismiss the last deployment result
    Dismiss,
    /// Revert pending node additions and deletions
    DiscardChanges,
    /// Stop the running deployment
    StopDeployment,
    /// Contrail settings of the cluster
    Contrail {
        #[command(subcommand)]
        action: ContrailCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ContrailCommand {
    Show,
    /// Add a WAN gateway and save
    AddGateway { hostname: String, ip: String },
    /// Remove the WAN gateway at INDEX and save
    DeleteGateway { index: usize },
    /// Change the AS number and save
    SetAsNumber { as_number: u32 },
    /// Replace the settings with server defaults and save
    LoadDefaults,
}

impl Command {
    /// Tab the page opens on for this command
    pub fn initial_tab(&self) -> TabKind {
        match self {
            Command::Watch { tab } => *tab,
            Command::Contrail { .. } => TabKind::Contrail,
            _ => TabKind::Nodes,
        }
    }
}
