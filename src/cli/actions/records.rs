//! Skills, education and experience: JSON in, JSON out.

use crate::{
    api::{ExperienceInput, JsonCollection},
    cli::{actions::print_json, globals::GlobalArgs},
};
use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Skills,
    Education,
    Experience,
}

impl Collection {
    /// # Errors
    /// Returns an error for an unknown collection name.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "skills" => Ok(Self::Skills),
            "education" => Ok(Self::Education),
            "experience" => Ok(Self::Experience),
            other => Err(anyhow!("unknown collection: {other}")),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skills => "skills",
            Self::Education => "education",
            Self::Experience => "experience",
        })
    }
}

/// `data` is inline JSON or `@path`.
#[derive(Debug)]
pub enum Operation {
    List,
    Show(u64),
    Add { data: String },
    Update { id: u64, data: String },
    Delete(u64),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub collection: Collection,
    pub operation: Operation,
}

async fn read_data(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {path}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("invalid JSON body")
}

async fn decode<I: DeserializeOwned>(raw: &str, collection: Collection) -> Result<I> {
    let value = read_data(raw).await?;
    serde_json::from_value(value).with_context(|| format!("invalid {collection} record"))
}

async fn run<T, I>(
    records: JsonCollection<T, I>,
    collection: Collection,
    operation: Operation,
    prepare: fn(I) -> I,
) -> Result<()>
where
    T: DeserializeOwned + Serialize,
    I: DeserializeOwned + Serialize,
{
    match operation {
        Operation::List => {
            let list = records
                .list()
                .await
                .with_context(|| format!("failed to list {collection}"))?;
            print_json(&list)
        }
        Operation::Show(id) => {
            let record = records
                .get(id)
                .await
                .with_context(|| format!("failed to fetch {collection} {id}"))?;
            print_json(&record)
        }
        Operation::Add { data } => {
            let input = prepare(decode(&data, collection).await?);
            let record = records
                .create(&input)
                .await
                .with_context(|| format!("failed to create {collection} record"))?;
            print_json(&record)
        }
        Operation::Update { id, data } => {
            let input = prepare(decode(&data, collection).await?);
            let record = records
                .update(id, &input)
                .await
                .with_context(|| format!("failed to update {collection} {id}"))?;
            print_json(&record)
        }
        Operation::Delete(id) => {
            records
                .delete(id)
                .await
                .with_context(|| format!("failed to delete {collection} {id}"))?;
            println!("deleted {collection} {id}");
            Ok(())
        }
    }
}

/// # Errors
/// Returns an error if the body is invalid or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let client = args.globals.client()?;
    match args.collection {
        Collection::Skills => {
            run(client.skills(), args.collection, args.operation, |input| input).await
        }
        Collection::Education => {
            run(client.education(), args.collection, args.operation, |input| input).await
        }
        Collection::Experience => {
            run(
                client.experience(),
                args.collection,
                args.operation,
                ExperienceInput::normalized,
            )
            .await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::SkillInput;

    #[test]
    fn collection_names() {
        for (name, _) in crate::cli::commands::resources::JSON_COLLECTIONS {
            assert_eq!(Collection::parse(name).unwrap().to_string(), name);
        }
        assert!(Collection::parse("projects").is_err());
    }

    #[tokio::test]
    async fn inline_data_decodes() {
        let input: SkillInput = decode(r#"{"name":"Rust","level":"Expert"}"#, Collection::Skills)
            .await
            .unwrap();
        assert_eq!(input.name, "Rust");
    }

    #[tokio::test]
    async fn file_data_decodes() {
        let path = std::env::temp_dir().join(format!("skill-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"name":"Go","level":"Intermediate"}"#)
            .await
            .unwrap();

        let raw = format!("@{}", path.display());
        let input: SkillInput = decode(&raw, Collection::Skills).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();
        assert_eq!(input.level, "Intermediate");
    }

    #[tokio::test]
    async fn wrong_shape_is_rejected() {
        let result: Result<SkillInput> = decode(r#"{"name":"Rust"}"#, Collection::Skills).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid skills record"), "{err}");
    }
}
