pub mod config;
pub mod simulate;
pub mod watch;

use std::path::Path;

use defer_core::error::Result;
use defer_core::{write_json_lines, Config, Event};

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Print events as JSON lines on stdout.
pub fn print_events(events: &[Event]) -> Result<()> {
    write_json_lines(std::io::stdout().lock(), events)
}
