//! Maps validated CLI matches to an `Action`.

use crate::{
    api::NewContactMessage,
    cli::{
        actions::{contact, login, messages, profile, projects, records, Action},
        commands::{api, leaf, resources::*},
        globals::GlobalArgs,
    },
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

fn string(matches: &ArgMatches, id: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    string(matches, id).ok_or_else(|| anyhow!("missing required argument: --{id}"))
}

fn id(matches: &ArgMatches) -> Result<u64> {
    matches
        .get_one::<u64>(ARG_ID)
        .copied()
        .context("missing record id")
}

fn subcommand(matches: &ArgMatches) -> Result<(&str, &ArgMatches)> {
    matches.subcommand().context("missing subcommand")
}

fn login_args(globals: GlobalArgs, matches: &ArgMatches) -> Result<login::Args> {
    let username = required(matches, ARG_USERNAME)?;
    let password = if matches.get_flag(ARG_PASSWORD_STDIN) {
        login::Password::Stdin
    } else {
        match matches.get_one::<String>(ARG_PASSWORD) {
            Some(value) if !value.is_empty() => {
                login::Password::Value(SecretString::from(value.clone()))
            }
            _ => login::Password::Prompt,
        }
    };

    Ok(login::Args {
        globals,
        username,
        password,
    })
}

fn project_fields(matches: &ArgMatches) -> projects::Fields {
    projects::Fields {
        title: string(matches, ARG_TITLE),
        description: string(matches, ARG_DESCRIPTION),
        link: string(matches, ARG_LINK),
        order: matches.get_one::<i64>(ARG_ORDER).copied(),
        image: string(matches, ARG_IMAGE).map(PathBuf::from),
    }
}

fn projects_operation(matches: &ArgMatches) -> Result<projects::Operation> {
    let (name, sub) = subcommand(matches)?;
    Ok(match name {
        "list" => projects::Operation::List,
        "show" => projects::Operation::Show(id(sub)?),
        "add" => projects::Operation::Add(project_fields(sub)),
        "update" => projects::Operation::Update(id(sub)?, project_fields(sub)),
        "delete" => projects::Operation::Delete(id(sub)?),
        other => return Err(anyhow!("unknown projects command: {other}")),
    })
}

fn records_operation(matches: &ArgMatches) -> Result<records::Operation> {
    let (name, sub) = subcommand(matches)?;
    Ok(match name {
        "list" => records::Operation::List,
        "show" => records::Operation::Show(id(sub)?),
        "add" => records::Operation::Add {
            data: required(sub, ARG_DATA)?,
        },
        "update" => records::Operation::Update {
            id: id(sub)?,
            data: required(sub, ARG_DATA)?,
        },
        "delete" => records::Operation::Delete(id(sub)?),
        other => return Err(anyhow!("unknown command: {other}")),
    })
}

fn messages_operation(matches: &ArgMatches) -> Result<messages::Operation> {
    let (name, sub) = subcommand(matches)?;
    Ok(match name {
        "list" => messages::Operation::List,
        "delete" => messages::Operation::Delete(id(sub)?),
        other => return Err(anyhow!("unknown messages command: {other}")),
    })
}

fn profile_operation(matches: &ArgMatches) -> Result<profile::Operation> {
    let (name, sub) = subcommand(matches)?;
    Ok(match name {
        "show" => profile::Operation::Show,
        "upload" => profile::Operation::Upload(PathBuf::from(required(sub, ARG_IMAGE)?)),
        "delete" => profile::Operation::Delete(id(sub)?),
        other => return Err(anyhow!("unknown profile command: {other}")),
    })
}

fn contact_message(matches: &ArgMatches) -> Result<NewContactMessage> {
    let (name, sub) = subcommand(matches)?;
    if name != "send" {
        return Err(anyhow!("unknown contact command: {name}"));
    }
    Ok(NewContactMessage {
        name: required(sub, ARG_NAME)?,
        email: required(sub, ARG_EMAIL)?,
        message: required(sub, ARG_MESSAGE)?,
    })
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::new(api::Options::parse(leaf(matches))?);
    let (name, sub) = subcommand(matches)?;

    let action = match name {
        "login" => Action::Login(login_args(globals, sub)?),
        "logout" => Action::Logout(globals),
        "whoami" => Action::Whoami(globals),
        "status" => Action::Status(globals),
        "projects" => Action::Projects(projects::Args {
            globals,
            operation: projects_operation(sub)?,
        }),
        "skills" | "education" | "experience" => Action::Records(records::Args {
            globals,
            collection: records::Collection::parse(name)?,
            operation: records_operation(sub)?,
        }),
        "messages" => Action::Messages(messages::Args {
            globals,
            operation: messages_operation(sub)?,
        }),
        "profile" => Action::Profile(profile::Args {
            globals,
            operation: profile_operation(sub)?,
        }),
        "contact" => Action::Contact(contact::Args {
            globals,
            message: contact_message(sub)?,
        }),
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(action)
}
