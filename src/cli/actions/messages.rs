use crate::cli::{actions::print_json, globals::GlobalArgs};
use anyhow::{Context, Result};

#[derive(Debug)]
pub enum Operation {
    List,
    Delete(u64),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub operation: Operation,
}

/// # Errors
/// Returns an error if the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let messages = args.globals.client()?.messages();

    match args.operation {
        Operation::List => {
            let list = messages.list().await.context("failed to list messages")?;
            print_json(&list)
        }
        Operation::Delete(id) => {
            messages
                .delete(id)
                .await
                .with_context(|| format!("failed to delete message {id}"))?;
            println!("deleted message {id}");
            Ok(())
        }
    }
}
