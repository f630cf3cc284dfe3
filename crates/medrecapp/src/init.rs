//! # Startup
//!
//! [`initialize`] is the composition root: the one place where the data directory is
//! chosen, configuration is loaded, the backend is opened and the services are wired
//! together. There are no global singletons; everything hangs off the returned
//! [`MedrecContext`].
//!
//! ## Data Directory Resolution
//!
//! 1. `data_override` (the CLI's `--data` flag) if provided.
//! 2. The `MEDREC_DATA` environment variable, if set.
//! 3. The OS-appropriate data directory (via the `directories` crate).
//!
//! ## Config Resolution
//!
//! `medrec.toml` is looked up in the global config directory and then in the data
//! directory, merged in that order so the data directory wins. A missing or unreadable
//! file falls back to compiled defaults.
//!
//! ## Wiring Check
//!
//! Once the facade is built, its dependency checker must have a reference source for
//! every kind in [`DEPENDENT_KINDS`]. A missing one would let patient deletes through
//! unchecked, so startup fails with a config error instead.

use crate::api::{RecordsApi, DEPENDENT_KINDS};
use crate::config::MedrecConfig;
use crate::error::{MedrecError, Result};
use crate::store::FsBackend;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DATA_ENV: &str = "MEDREC_DATA";
pub const CONFIG_FILE: &str = "medrec.toml";

pub struct MedrecContext {
    pub api: RecordsApi<FsBackend>,
    pub config: MedrecConfig,
    pub data_dir: PathBuf,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "medrec", "medrec")
}

/// Picks the data directory, see the module docs for the order.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| MedrecError::Config("could not determine a data directory".to_string()))
}

/// Directories searched for `medrec.toml`, lowest priority first.
pub fn config_search_dirs(data_dir: &std::path::Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(project) = project_dirs() {
        dirs.push(project.config_dir().to_path_buf());
    }
    dirs.push(data_dir.to_path_buf());
    dirs
}

pub fn load_config(data_dir: &std::path::Path) -> MedrecConfig {
    let search_paths = config_search_dirs(data_dir)
        .into_iter()
        .map(SearchPath::Path)
        .collect();

    Clapfig::builder()
        .app_name("medrec")
        .file_name(CONFIG_FILE)
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Builds the context: data dir, config, backend, facade, wiring check.
pub fn initialize(data_override: Option<PathBuf>) -> Result<MedrecContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = load_config(&data_dir);
    tracing::debug!(
        data_dir = %data_dir.display(),
        id_floor = config.id_floor,
        keep_backups = config.keep_backups,
        "initializing"
    );

    let backend = FsBackend::new(&data_dir).with_backups(config.keep_backups);
    let api = RecordsApi::open(backend, &config)?;
    api.dependency_checker().assert_wired(DEPENDENT_KINDS)?;

    Ok(MedrecContext {
        api,
        config,
        data_dir,
    })
}
