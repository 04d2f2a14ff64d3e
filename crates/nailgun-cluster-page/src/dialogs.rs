/*
[INPUT]:  Confirmation and error prompts raised by page operations
[OUTPUT]: Async dialog seam (terminal implementation lives in the binary)
[POS]:    Collaborator contract - user confirmation
[UPDATE]: When adding new confirmation prompts
*/

use std::fmt;

use async_trait::async_trait;

/// Warning shown when leaving a page with unsaved edits
pub const UNSAVED_CHANGES_MESSAGE: &str =
    "Settings were modified but not saved. Do you want to discard your changes and leave the page?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// Leave a tab (or deploy) while it has unsaved edits
    DiscardSettingsChanges { verification_running: bool },
    /// Review the pending changes before deploying them
    DeployChanges { changes: Vec<String> },
    /// Revert pending node additions/deletions
    DiscardChanges { pending_nodes: usize },
    StopDeployment,
}

impl fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmPrompt::DiscardSettingsChanges { verification_running } => {
                f.write_str(UNSAVED_CHANGES_MESSAGE)?;
                if *verification_running {
                    f.write_str(" Network verification is still running.")?;
                }
                Ok(())
            }
            ConfirmPrompt::DeployChanges { changes } if changes.is_empty() => {
                f.write_str("Deploy the environment?")
            }
            ConfirmPrompt::DeployChanges { changes } => {
                write!(f, "Deploy the following changes: {}?", changes.join(", "))
            }
            ConfirmPrompt::DiscardChanges { pending_nodes } => {
                write!(f, "Discard pending changes on {pending_nodes} node(s)?")
            }
            ConfirmPrompt::StopDeployment => f.write_str("Stop the running deployment?"),
        }
    }
}

/// User-facing dialogs.
///
/// `confirm` resolves `true` only on explicit confirmation.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool;

    async fn show_error(&self, title: &str, message: &str);
}
