//! CLI command implementations.

use std::io::{self, IsTerminal};

use inquire::{
    Confirm, MultiSelect, Select,
    error::{InquireError, InquireResult},
};

use crate::{
    catalog::ResolvedSkill,
    config::{Config, Credentials},
    error::{Error, Result},
    reconcile::Mode,
    remote::SalesforceClient,
    selection::Selection,
};

/// Output color handling selection.
#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    /// Colorize only when output is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

impl ColorChoice {
    /// Determine whether color output should be enabled.
    pub(crate) fn enabled(self) -> bool {
        match self {
            Self::Auto => io::stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

// Command modules are ordered alphabetically - maintain this order.
/// Apply command implementation.
pub mod apply;
/// Shared plan, preview and execute loop for batch commands.
mod batch;
/// Groups command implementation.
pub mod groups;
/// Init command implementation.
pub mod init;
/// Remove command implementation.
pub mod remove;
/// Show command implementation.
pub mod show;

/// Log in with credentials from the environment.
async fn connect(config: &Config, credentials: &Credentials) -> Result<SalesforceClient> {
    SalesforceClient::connect(credentials, config.api_version()).await
}

/// Map an inquire outcome onto the crate's prompt errors.
fn prompt_outcome<T>(result: InquireResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Err(Error::PromptCanceled)
        }
        Err(error) => Err(Error::PromptFailed {
            message: error.to_string(),
        }),
    }
}

/// Ask a yes/no question, defaulting to no.
fn confirm(message: &str) -> Result<bool> {
    prompt_outcome(Confirm::new(message).with_default(false).prompt())
}

/// Ask which configured group to target and return its name.
fn prompt_group(config: &Config) -> Result<String> {
    let names = config
        .groups()
        .iter()
        .map(|group| group.name.clone())
        .collect::<Vec<_>>();
    prompt_outcome(Select::new("Group", names).prompt())
}

/// Ask which removal mode to use.
fn prompt_mode() -> Result<Mode> {
    prompt_outcome(Select::new("Mode", Mode::ALL.to_vec()).prompt())
}

/// Ask which of a group's skills to apply; everything starts selected.
fn prompt_selection(resolved: &[ResolvedSkill]) -> Result<Selection> {
    let labels = resolved
        .iter()
        .map(|skill| skill.label.clone())
        .collect::<Vec<_>>();
    let chosen = prompt_outcome(
        MultiSelect::new("Skills to apply", labels)
            .with_all_selected_by_default()
            .raw_prompt(),
    )?;
    Ok(Selection::Indices(
        chosen.into_iter().map(|option| option.index + 1).collect(),
    ))
}
