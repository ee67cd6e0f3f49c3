#![forbid(unsafe_code)]

//! envpick binary entry point.
//!
//! Exit codes: 0 on success, 1 for a failed selection, 2 for usage or
//! configuration problems, 130 when the user cancels the menu.

mod cli;
mod config;
mod list;

use std::fmt;
use std::io::{self, Write};
use std::process;

use envpick_core::layout::Layout;
use envpick_core::{Capabilities, SelectConfig, SelectError, select_profile};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, Opts};
use crate::config::{Config, ConfigError, Environment};

/// Why the binary could not finish its command.
#[derive(Debug)]
enum AppError {
    Config(ConfigError),
    UnknownEnvironment(String),
    Select(SelectError),
    Output(io::Error),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Select(err) if err.is_cancelled() => 130,
            Self::Config(_) | Self::UnknownEnvironment(_) => 2,
            Self::Select(SelectError::NoProfiles) => 2,
            Self::Select(_) | Self::Output(_) => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::UnknownEnvironment(name) => write!(f, "environment '{name}' not found"),
            Self::Select(err) => write!(f, "environment selection failed: {err}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Select(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::UnknownEnvironment(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SelectError> for AppError {
    fn from(err: SelectError) -> Self {
        Self::Select(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

fn main() {
    let opts = Opts::parse();
    init_logging();

    if let Err(err) = run(&opts) {
        let code = err.exit_code();
        // The menu already said so.
        if code != 130 {
            eprintln!("Error: {err}");
        }
        process::exit(code);
    }
}

/// Install a stderr subscriber when `ENVPICK_LOG` is set.
fn init_logging() {
    let Ok(directives) = std::env::var("ENVPICK_LOG") else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(opts: &Opts) -> Result<(), AppError> {
    let path = match &opts.config_path {
        Some(path) => path.clone(),
        None => config::default_path()?,
    };
    let config = config::load(&path)?;
    tracing::debug!(command = ?opts.command, path = %path.display(), "running");

    match opts.command {
        Command::List => {
            let layout = Layout::plan(&Capabilities::probe());
            let mut out = io::stdout().lock();
            list::write_environments(&mut out, &config, &layout)?;
        }
        Command::Select => {
            let env = choose(opts, &config)?;
            let mut out = io::stdout().lock();
            writeln!(out, "Using environment: {} ({})", env.name, env.url)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn choose<'c>(opts: &Opts, config: &'c Config) -> Result<&'c Environment, AppError> {
    if let Some(name) = &opts.env_name {
        return config
            .find(name)
            .ok_or_else(|| AppError::UnknownEnvironment(name.clone()));
    }

    let mut select_config = SelectConfig::from_env();
    if opts.tier.is_some() {
        select_config.force_tier = opts.tier;
    }

    let profiles = config.profiles();
    let chosen = select_profile(&profiles, select_config)?;
    config
        .find(&chosen.name)
        .ok_or_else(|| AppError::UnknownEnvironment(chosen.name.clone()))
}
