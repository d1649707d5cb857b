use crate::{api::NewContactMessage, cli::globals::GlobalArgs};
use anyhow::{Context, Result};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub message: NewContactMessage,
}

/// # Errors
/// Returns an error if the message is invalid or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let ack = args
        .globals
        .client()?
        .contact()
        .send(&args.message)
        .await
        .context("failed to send message")?;

    if ack.detail.is_empty() {
        println!("message sent");
    } else {
        println!("{}", ack.detail);
    }
    Ok(())
}
