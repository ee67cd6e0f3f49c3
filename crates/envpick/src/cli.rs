#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `ENVPICK_*` prefix; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;

use envpick_core::SelectionTier;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
envpick - pick a configured API environment

USAGE:
    envpick [OPTIONS]          Select an environment and print it
    envpick list [OPTIONS]     List configured environments

OPTIONS:
    --config=PATH        Configuration file (default: ~/.envpick/config.json)
    --env=NAME           Use the named environment without showing a menu
    --tier=TIER          Force the selection tier: full, basic, numbered or headless
    --help, -h           Show this help message
    --version, -V        Show version

KEYS (interactive menu):
    Up / Down       Move the selection (wraps around)
    Enter           Confirm
    Esc / Ctrl+C    Cancel

ENVIRONMENT VARIABLES:
    ENVPICK_CONFIG        Override --config
    ENVPICK_ENV           Override --env
    ENVPICK_FORCE_TIER    Override --tier
    ENVPICK_READ_CHUNK    Bytes per key read in the interactive menu (default: 10)
    ENVPICK_LOG           Log filter for diagnostics on stderr (e.g. 'debug')";

/// What to do once options are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Pick an environment and print it.
    #[default]
    Select,
    /// Print every configured environment.
    List,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Opts {
    pub command: Command,
    /// Configuration file; `None` means the default location.
    pub config_path: Option<PathBuf>,
    /// Environment to use without a menu.
    pub env_name: Option<String>,
    /// Tier to start the menu in.
    pub tier: Option<SelectionTier>,
}

/// Result of parsing, before any side effects.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version` and invalid input.
    pub fn parse() -> Self {
        let mut opts = Self::default();
        opts.apply_env(|name| env::var(name).ok());

        match opts.apply_args(env::args().skip(1)) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("envpick {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    /// Apply `ENVPICK_*` overrides. Invalid values are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ENVPICK_CONFIG").filter(|v| !v.is_empty()) {
            self.config_path = Some(PathBuf::from(val));
        }
        if let Some(val) = var("ENVPICK_ENV").filter(|v| !v.is_empty()) {
            self.env_name = Some(val);
        }
        if let Some(val) = var("ENVPICK_FORCE_TIER")
            && let Ok(tier) = val.trim().parse()
        {
            self.tier = Some(tier);
        }
    }

    /// Apply command-line arguments on top of the current options.
    pub fn apply_args<I>(mut self, args: I) -> Result<Parsed, String>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for arg in args {
            let arg: String = arg.into();
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "list" => self.command = Command::List,
                other => {
                    if let Some(val) = other.strip_prefix("--config=") {
                        if val.is_empty() {
                            return Err("Invalid --config value: path is empty".to_string());
                        }
                        self.config_path = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--env=") {
                        if val.is_empty() {
                            return Err("Invalid --env value: name is empty".to_string());
                        }
                        self.env_name = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--tier=") {
                        match val.parse() {
                            Ok(tier) => self.tier = Some(tier),
                            Err(err) => return Err(format!("Invalid --tier value: {err}")),
                        }
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }
        Ok(Parsed::Run(self))
    }
}
