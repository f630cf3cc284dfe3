//! # CLI Layer
//!
//! This module is **one possible UI client** for medrec, it is not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a `tracing` subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Logging**: Route library diagnostics to stderr, filtered by `-v` or `MEDREC_LOG`
//! 3. **Context Setup**: Open the records through `medrecapp::init::initialize`
//! 4. **Dispatch**: Hand each command group to its handler
//! 5. **Error Handling**: Errors are returned to `main`, which prints them and exits 1

use super::handlers::{self, AppState};
use super::setup::{Cli, Commands, ConfigCommands, OutputMode, PatientCommands};
use anyhow::Result;
use clap::Parser;
use clapfig::{Clapfig, ClapfigBuilder, ConfigAction, SearchPath};
use medrecapp::config::MedrecConfig;
use medrecapp::init::{config_search_dirs, initialize, resolve_data_dir, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Overrides the `-v` derived filter, e.g. `MEDREC_LOG=medrecapp=debug`.
pub const LOG_ENV: &str = "MEDREC_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Naked `medrec` lists patients
    let command = cli.command.unwrap_or(Commands::Patient {
        action: PatientCommands::List { admitted: false },
    });

    match command {
        Commands::Config { action } => {
            let data_dir = resolve_data_dir(cli.data)?;
            handle_config_command(action.as_ref(), &data_dir)
        }
        Commands::Doctor => handlers::doctor(&open(cli.data, cli.output)?),
        Commands::Patient { action } => handlers::patient(&mut open(cli.data, cli.output)?, action),
        Commands::Appointment { action } => {
            handlers::appointment(&mut open(cli.data, cli.output)?, action)
        }
        Commands::Bill { action } => handlers::bill(&mut open(cli.data, cli.output)?, action),
        Commands::Record { action } => handlers::record(&mut open(cli.data, cli.output)?, action),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn open(data: Option<PathBuf>, output: OutputMode) -> Result<AppState> {
    let ctx = initialize(data)?;
    tracing::debug!(data_dir = %ctx.data_dir.display(), "records opened");
    Ok(AppState::new(ctx.api, output))
}

/// Search paths for loading, global first so the data dir overrides it.
fn build_load_paths(data_dir: &Path) -> Vec<SearchPath> {
    config_search_dirs(data_dir)
        .into_iter()
        .map(SearchPath::Path)
        .collect()
}

/// The one clapfig setup every `medrec config` form shares.
fn config_builder(data_dir: &Path) -> ClapfigBuilder<MedrecConfig> {
    Clapfig::builder::<MedrecConfig>()
        .app_name("medrec")
        .file_name(CONFIG_FILE)
        .search_paths(build_load_paths(data_dir))
        .no_env()
        .strict(false)
}

/// Maps a `medrec config` subcommand onto the clapfig action that serves it.
fn config_action(command: &ConfigCommands) -> ConfigAction {
    match command {
        ConfigCommands::Gen { file } => ConfigAction::Gen {
            output: file.clone(),
        },
        ConfigCommands::Get { key } => ConfigAction::Get {
            key: key.clone(),
            scope: None,
        },
    }
}

fn handle_config_command(action: Option<&ConfigCommands>, data_dir: &Path) -> Result<()> {
    let Some(command) = action else {
        // Bare `medrec config`: every resolved value, defaults included
        let config = config_builder(data_dir).load().unwrap_or_default();
        if let toml::Value::Table(t) = toml::Value::try_from(&config)? {
            for (k, v) in &t {
                println!("{} = {}", k, format_toml_value(v));
            }
        }
        return Ok(());
    };

    let result = config_builder(data_dir)
        .handle(&config_action(command))
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let text = result.to_string();
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
    Ok(())
}

/// Format a TOML value for display.
fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_values_are_shown_as_written() {
        assert_eq!(format_toml_value(&toml::Value::Integer(100)), "100");
        assert_eq!(format_toml_value(&toml::Value::Boolean(true)), "true");
        assert_eq!(
            format_toml_value(&toml::Value::String("x".into())),
            "\"x\""
        );
    }

    #[test]
    fn config_subcommands_map_to_clapfig_actions() {
        let get = config_action(&ConfigCommands::Get {
            key: "id_floor".into(),
        });
        assert!(matches!(get, ConfigAction::Get { ref key, scope: None } if key == "id_floor"));

        let gen = config_action(&ConfigCommands::Gen { file: None });
        assert!(matches!(gen, ConfigAction::Gen { output: None }));
    }

    #[test]
    fn get_reads_the_data_dir_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "id_floor = 700\n").unwrap();
        let result = config_builder(dir.path())
            .handle(&ConfigAction::Get {
                key: "id_floor".into(),
                scope: None,
            })
            .unwrap();
        assert!(result.to_string().contains("700"));
    }

    #[test]
    fn load_paths_end_with_the_data_dir() {
        let paths = build_load_paths(Path::new("/tmp/records"));
        assert!(matches!(
            paths.last(),
            Some(SearchPath::Path(p)) if p == Path::new("/tmp/records")
        ));
    }
}
