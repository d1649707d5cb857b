use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug)]
pub enum Password {
    Value(SecretString),
    Stdin,
    Prompt,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: Password,
}

async fn read_line() -> Result<SecretString> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(anyhow!("empty password"));
    }
    Ok(SecretString::from(password.to_string()))
}

async fn resolve_password(password: Password) -> Result<SecretString> {
    match password {
        Password::Value(secret) => Ok(secret),
        Password::Stdin => read_line().await,
        Password::Prompt => {
            eprint!("Password: ");
            std::io::stderr().flush().ok();
            read_line().await
        }
    }
}

/// Execute the login action.
/// # Errors
/// Returns an error if the credentials are rejected, the account is not staff,
/// or the session file cannot be written.
pub async fn execute(args: Args) -> Result<()> {
    let password = resolve_password(args.password).await?;
    let session = args.globals.session()?;

    debug!(username = %args.username, api_url = %args.globals.api_url, "signing in");
    let user = session
        .login(&args.username, &password)
        .await
        .with_context(|| format!("login failed for {}", args.username))?;

    println!("signed in as {} ({})", user.display_name(), user.email);
    Ok(())
}
