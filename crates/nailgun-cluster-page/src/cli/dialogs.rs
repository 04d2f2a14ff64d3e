/*
[INPUT]:  Confirmation prompts and errors from page operations
[OUTPUT]: Terminal prompts via dialoguer
[POS]:    CLI layer - Dialogs implementation
[UPDATE]: When prompt presentation changes
*/

use async_trait::async_trait;
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing::warn;

use nailgun_cluster_page::{ConfirmPrompt, Dialogs};

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalDialogs {
    assume_yes: bool,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        let text = prompt.to_string();
        if self.assume_yes {
            println!("{} {}", style(text).dim(), style("yes").green());
            return true;
        }
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(text)
                .default(false)
                .interact()
        })
        .await;
        match answer {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(err)) => {
                warn!(error = %err, "confirmation prompt failed");
                false
            }
            Err(err) => {
                warn!(error = %err, "confirmation prompt task failed");
                false
            }
        }
    }

    async fn show_error(&self, title: &str, message: &str) {
        eprintln!("{} {}", style(format!("{title}:")).bold().red(), message);
    }
}
