use crate::{
    api::ImageFile,
    cli::{actions::print_json, globals::GlobalArgs},
};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Operation {
    Show,
    Upload(PathBuf),
    Delete(u64),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub operation: Operation,
}

/// # Errors
/// Returns an error if the image cannot be read or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let profile = args.globals.client()?.profile();

    match args.operation {
        Operation::Show => match profile.current().await.context("failed to fetch profile")? {
            Some(record) => print_json(&record),
            None => {
                println!("no profile image");
                Ok(())
            }
        },
        Operation::Upload(path) => {
            let image = ImageFile::from_path(&path)?;
            let record = profile
                .set_image(image)
                .await
                .context("failed to upload profile image")?;
            print_json(&record)
        }
        Operation::Delete(id) => {
            profile
                .delete(id)
                .await
                .with_context(|| format!("failed to delete profile {id}"))?;
            println!("deleted profile {id}");
            Ok(())
        }
    }
}
