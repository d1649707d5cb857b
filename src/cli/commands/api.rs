use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT: &str = "timeout";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl Options {
    /// Parse API connection arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or no session file location can be derived.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let raw_url = matches
            .get_one::<String>(ARG_API_URL)
            .map_or(DEFAULT_API_URL, String::as_str);
        let api_url = crate::session::parse_base_url(raw_url)
            .with_context(|| format!("invalid --{ARG_API_URL}"))?;

        let session_file = match matches.get_one::<String>(ARG_SESSION_FILE) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file()?,
        };

        let timeout = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10);
        if timeout == 0 {
            return Err(anyhow!("--{ARG_TIMEOUT} must be greater than 0"));
        }

        Ok(Self {
            api_url,
            session_file,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// `portfolio-admin/session.json` under the platform config directory.
///
/// # Errors
/// Returns an error if the platform has no config directory.
pub fn default_session_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("session.json"))
        .ok_or_else(|| anyhow!("no config directory found, use --{ARG_SESSION_FILE}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the portfolio API")
                .env("PORTFOLIO_API_URL")
                .global(true)
                .default_value(DEFAULT_API_URL),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("Where the session tokens are kept (default: <config dir>/portfolio-admin/session.json)")
                .env("PORTFOLIO_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("PORTFOLIO_TIMEOUT")
                .global(true)
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}
