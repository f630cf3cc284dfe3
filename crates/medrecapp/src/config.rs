//! # Configuration
//!
//! Configuration is managed by [`clapfig`], which handles layered loading from TOML
//! files, and [`confique`], which supplies the compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Data Dir Config**: `<data dir>/medrec.toml`. Travels with the records it governs.
//! 2. **Global Config**: `medrec.toml` in the OS config directory (via `directories`).
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `id_floor` | `100` | Numeric suffixes start above this, so the first patient is `P101` |
//! | `keep_backups` | `true` | Copy each file to `<file>.bak` before overwriting it |

use confique::Config;
use serde::{Deserialize, Serialize};

/// Configuration for medrec, stored in `medrec.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MedrecConfig {
    /// Identifier numbers are allocated above this value.
    #[config(default = 100)]
    pub id_floor: u64,

    /// Keep a `.bak` copy of the previous version of every file.
    #[config(default = true)]
    pub keep_backups: bool,
}

impl Default for MedrecConfig {
    fn default() -> Self {
        Self {
            id_floor: 100,
            keep_backups: true,
        }
    }
}
