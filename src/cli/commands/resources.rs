//! Subcommands: session management and one group per dashboard resource.

use clap::{Arg, ArgAction, Command};

pub const ARG_ID: &str = "id";
pub const ARG_DATA: &str = "data";
pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_PASSWORD_STDIN: &str = "password-stdin";
pub const ARG_TITLE: &str = "title";
pub const ARG_DESCRIPTION: &str = "description";
pub const ARG_LINK: &str = "link";
pub const ARG_ORDER: &str = "order";
pub const ARG_IMAGE: &str = "image";
pub const ARG_NAME: &str = "name";
pub const ARG_EMAIL: &str = "email";
pub const ARG_MESSAGE: &str = "message";

/// Resources edited through JSON bodies, with their help text.
pub const JSON_COLLECTIONS: [(&str, &str); 3] = [
    ("skills", "Manage skills"),
    ("education", "Manage education entries"),
    ("experience", "Manage work experience"),
];

fn id_arg() -> Arg {
    Arg::new(ARG_ID)
        .help("Record id")
        .required(true)
        .value_parser(clap::value_parser!(u64))
}

fn data_arg() -> Arg {
    Arg::new(ARG_DATA)
        .long(ARG_DATA)
        .short('d')
        .help("JSON body, or @path to read it from a file")
        .required(true)
}

fn login() -> Command {
    Command::new("login")
        .about("Sign in with a staff account")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long(ARG_USERNAME)
                .help("Account username")
                .env("PORTFOLIO_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Account password")
                .env("PORTFOLIO_PASSWORD")
                .hide_env_values(true)
                .conflicts_with(ARG_PASSWORD_STDIN),
        )
        .arg(
            Arg::new(ARG_PASSWORD_STDIN)
                .long(ARG_PASSWORD_STDIN)
                .help("Read the password from stdin")
                .action(ArgAction::SetTrue),
        )
}

fn projects() -> Command {
    let form_args = |command: Command, required: bool| {
        command
            .arg(
                Arg::new(ARG_TITLE)
                    .long(ARG_TITLE)
                    .help("Project title")
                    .required(required),
            )
            .arg(
                Arg::new(ARG_DESCRIPTION)
                    .long(ARG_DESCRIPTION)
                    .help("Project description")
                    .required(required),
            )
            .arg(
                Arg::new(ARG_IMAGE)
                    .long(ARG_IMAGE)
                    .help("Path to the project image")
                    .required(required),
            )
            .arg(Arg::new(ARG_LINK).long(ARG_LINK).help("Project URL"))
            .arg(
                Arg::new(ARG_ORDER)
                    .long(ARG_ORDER)
                    .help("Display order")
                    .value_parser(clap::value_parser!(i64)),
            )
    };

    Command::new("projects")
        .about("Manage portfolio projects")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List projects"))
        .subcommand(Command::new("show").about("Show a project").arg(id_arg()))
        .subcommand(form_args(
            Command::new("add").about("Create a project"),
            true,
        ))
        .subcommand(form_args(
            Command::new("update")
                .about("Update a project; omitted fields are kept")
                .arg(id_arg()),
            false,
        ))
        .subcommand(Command::new("delete").about("Delete a project").arg(id_arg()))
}

fn json_collection(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List records"))
        .subcommand(Command::new("show").about("Show a record").arg(id_arg()))
        .subcommand(Command::new("add").about("Create a record").arg(data_arg()))
        .subcommand(
            Command::new("update")
                .about("Replace a record")
                .arg(id_arg())
                .arg(data_arg()),
        )
        .subcommand(Command::new("delete").about("Delete a record").arg(id_arg()))
}

fn messages() -> Command {
    Command::new("messages")
        .about("Read contact messages")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List messages, newest first"))
        .subcommand(Command::new("delete").about("Delete a message").arg(id_arg()))
}

fn profile() -> Command {
    Command::new("profile")
        .about("Manage the profile image")
        .subcommand_required(true)
        .subcommand(Command::new("show").about("Show the profile image record"))
        .subcommand(
            Command::new("upload")
                .about("Upload or replace the profile image")
                .arg(
                    Arg::new(ARG_IMAGE)
                        .help("Path to the image")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a profile image record")
                .arg(id_arg()),
        )
}

fn contact() -> Command {
    Command::new("contact")
        .about("Public contact form")
        .subcommand_required(true)
        .subcommand(
            Command::new("send")
                .about("Send a message through the contact form")
                .arg(Arg::new(ARG_NAME).long(ARG_NAME).required(true))
                .arg(Arg::new(ARG_EMAIL).long(ARG_EMAIL).required(true))
                .arg(Arg::new(ARG_MESSAGE).long(ARG_MESSAGE).required(true)),
        )
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    let command = command
        .subcommand(login())
        .subcommand(Command::new("logout").about("Revoke and forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(Command::new("status").about("Show the session state"))
        .subcommand(projects());

    JSON_COLLECTIONS
        .into_iter()
        .fold(command, |command, (name, about)| {
            command.subcommand(json_collection(name, about))
        })
        .subcommand(messages())
        .subcommand(profile())
        .subcommand(contact())
}
