mod cli;
mod display;
mod error;

use std::path::{Path, PathBuf};

use clap::Parser;
use cli::{Cli, RunCommand};
use enoe::config::Config;
use error::EnoeCliResult;
use log::debug;

const DEFAULT_LOGGING_LEVEL: &str = "info";

fn main() -> EnoeCliResult<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config = read_config(args.config.as_deref())?;
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        command.run(config)?;
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    // macOS: ~/Library/Application Support/enoe/config.toml
    dirs::config_dir().map(|dir| dir.join("enoe").join("config.toml"))
}

/// Read the configuration from `path`, or from the default location when no path is given. Only
/// a missing default file falls back to `Config::default()`.
fn read_config(path: Option<&Path>) -> EnoeCliResult<Config> {
    let (file_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Config::default()),
        },
    };
    match std::fs::read_to_string(&file_path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            debug!("No config file at {}, using defaults", file_path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}
