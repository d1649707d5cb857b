use crate::{cli::globals::GlobalArgs, session::GuardState};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if the session file cannot be cleared.
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let session = globals.session()?;
    session.logout().await.context("failed to clear session")?;
    println!("signed out");
    Ok(())
}

/// Prints the cached user. Does not contact the API.
/// # Errors
/// Returns an error if the session file cannot be read.
pub fn whoami(globals: &GlobalArgs) -> Result<()> {
    let session = globals.session()?;
    match session.current_user()? {
        Some(user) => println!(
            "{} <{}> ({})",
            user.display_name(),
            user.email,
            if user.is_admin() { "admin" } else { "user" }
        ),
        None => println!("not signed in"),
    }
    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be read.
pub fn status(globals: &GlobalArgs) -> Result<()> {
    let session = globals.session()?;
    let state = match session.guard().state() {
        GuardState::Authenticated => "authenticated",
        GuardState::Unauthenticated => "unauthenticated",
    };
    println!("api:     {}", globals.api_url);
    println!("session: {}", globals.session_file.display());
    println!("state:   {state}");
    if let Some(user) = session.current_user()? {
        println!("user:    {}", user.username);
    }
    Ok(())
}
