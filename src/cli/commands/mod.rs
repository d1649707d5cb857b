pub mod api;
pub mod logging;
pub mod resources;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ArgMatches, ColorChoice, Command,
};

/// Deepest subcommand matches. Global arguments are always visible there.
#[must_use]
pub fn leaf(matches: &ArgMatches) -> &ArgMatches {
    let mut current = matches;
    while let Some((_, sub)) = current.subcommand() {
        current = sub;
    }
    current
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portfolio-admin")
        .about("Portfolio dashboard admin client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = resources::with_subcommands(command);
    let command = api::with_args(command);
    logging::with_args(command)
}
