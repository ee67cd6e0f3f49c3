#![forbid(unsafe_code)]

//! The `list` command.

use std::io::{self, Write};

use envpick_core::layout::{ColumnWidths, Layout};
use envpick_core::truncate::format_profile;

use crate::config::{Config, mask_api_key};

/// Print every environment with fields fitted to the terminal width.
pub fn write_environments<W: Write>(out: &mut W, config: &Config, layout: &Layout) -> io::Result<()> {
    if config.environments.is_empty() {
        writeln!(out, "No environments configured.")?;
        writeln!(out, "Add an entry to the configuration file to create your first environment.")?;
        return Ok(());
    }

    writeln!(out, "Configured environments ({}):", config.environments.len())?;

    let columns = ColumnWidths::plan(layout);
    for env in &config.environments {
        let display = format_profile(&env.profile(), &columns);

        writeln!(out, "\n  Name:  {}", display.display_name)?;
        writeln!(out, "  URL:   {}", display.display_url)?;
        writeln!(out, "  Model: {}", display.display_model)?;
        writeln!(out, "  Key:   {}", mask_api_key(&env.api_key))?;

        if !env.env_vars.is_empty() {
            writeln!(out, "  Env Variables:")?;
            for (key, value) in &env.env_vars {
                writeln!(out, "    {key}={value}")?;
            }
        }

        if !display.truncated.is_empty() {
            writeln!(out, "  (Truncated: {})", display.truncated.names().join(", "))?;
        }
    }
    out.flush()
}
