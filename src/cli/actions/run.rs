use crate::cli::actions::{
    contact, login, messages, profile, projects, records, session, Action,
};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(globals) => session::logout(&globals).await,
        Action::Whoami(globals) => session::whoami(&globals),
        Action::Status(globals) => session::status(&globals),
        Action::Projects(args) => projects::execute(args).await,
        Action::Records(args) => records::execute(args).await,
        Action::Messages(args) => messages::execute(args).await,
        Action::Profile(args) => profile::execute(args).await,
        Action::Contact(args) => contact::execute(args).await,
    }
}
