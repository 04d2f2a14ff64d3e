/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When PageConfig schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::Path;

use nailgun_cluster_page::PageConfig;

const LOG_LEVELS: [&str; 4] = ["error", "warn", "info", "debug"];

pub fn run_init(output: &Path, force: bool) -> Result<()> {
    println!("{}", style("Nailgun cluster page init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a configuration file.").dim()
    );

    let theme = ColorfulTheme::default();

    if output.exists() && !force {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Nothing written.").dim());
            return Ok(());
        }
    }

    let mut config = PageConfig::sample();

    println!("\n{}", style("--- Nailgun API ---").bold());
    config.api.base_url = Input::with_theme(&theme)
        .with_prompt("API base URL")
        .default(config.api.base_url.clone())
        .interact_text()?;

    let token: String = Input::with_theme(&theme)
        .with_prompt("Auth token (empty for none)")
        .allow_empty(true)
        .interact_text()?;
    config.api.auth_token = Some(token.trim().to_string()).filter(|token| !token.is_empty());

    println!("\n{}", style("--- Cluster ---").bold());
    let cluster_id: u64 = Input::with_theme(&theme)
        .with_prompt("Cluster ID")
        .default(config.cluster_id.unwrap_or(1))
        .interact_text()?;
    config.cluster_id = Some(cluster_id);

    config.update_interval_ms = Input::with_theme(&theme)
        .with_prompt("Poll interval while tasks run (ms)")
        .default(config.update_interval_ms)
        .interact_text()?;

    println!("\n{}", style("--- Logging ---").bold());
    let level = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&LOG_LEVELS)
        .default(2)
        .interact()?;
    config.log.level = LOG_LEVELS[level].to_string();

    config.validate()?;
    write_config(&config, output)?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

pub fn write_config(config: &PageConfig, output: &Path) -> Result<()> {
    let yaml = config.to_yaml()?;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))
}
