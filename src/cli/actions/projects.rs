use crate::{
    api::{ImageFile, ProjectForm},
    cli::{actions::print_json, globals::GlobalArgs},
};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct Fields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub order: Option<i64>,
    pub image: Option<PathBuf>,
}

impl Fields {
    fn into_form(self) -> Result<ProjectForm> {
        let image = match self.image {
            Some(path) => Some(ImageFile::from_path(&path)?),
            None => None,
        };
        Ok(ProjectForm {
            order: self.order,
            title: self.title,
            description: self.description,
            link: self.link,
            image,
        })
    }
}

#[derive(Debug)]
pub enum Operation {
    List,
    Show(u64),
    Add(Fields),
    Update(u64, Fields),
    Delete(u64),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub operation: Operation,
}

/// # Errors
/// Returns an error if the request fails or the image cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    let projects = args.globals.client()?.projects();

    match args.operation {
        Operation::List => {
            let list = projects.list().await.context("failed to list projects")?;
            print_json(&list)
        }
        Operation::Show(id) => {
            let project = projects
                .get(id)
                .await
                .with_context(|| format!("failed to fetch project {id}"))?;
            print_json(&project)
        }
        Operation::Add(fields) => {
            let project = projects
                .create(fields.into_form()?)
                .await
                .context("failed to create project")?;
            print_json(&project)
        }
        Operation::Update(id, fields) => {
            let project = projects
                .update(id, fields.into_form()?)
                .await
                .with_context(|| format!("failed to update project {id}"))?;
            print_json(&project)
        }
        Operation::Delete(id) => {
            projects
                .delete(id)
                .await
                .with_context(|| format!("failed to delete project {id}"))?;
            println!("deleted project {id}");
            Ok(())
        }
    }
}
