pub mod contact;
pub mod login;
pub mod messages;
pub mod profile;
pub mod projects;
pub mod records;
pub mod session;

// Internal "interpreter" for `Action`.
// The match lives in a separate module so `mod.rs` stays small as actions are added.
mod run;

use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(GlobalArgs),
    Whoami(GlobalArgs),
    Status(GlobalArgs),
    Projects(projects::Args),
    Records(records::Args),
    Messages(messages::Args),
    Profile(profile::Args),
    Contact(contact::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Pretty-prints a value as JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}
