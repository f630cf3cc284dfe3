//! # Medrec CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/medrecapp/`: the UI-agnostic records library
//! - `crates/medrec/`: this CLI, one client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/medrec/src/cli/)                         │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring, logging, dispatch (commands.rs)          │
//! │  - One handler per command group (handlers.rs)              │
//! │  - Terminal and JSON rendering (render.rs, styles.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/medrecapp/src/api.rs)                    │
//! │  - RecordsApi: every operation, returns Outcome<T>          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI is responsible for **all** user-facing concerns: argument parsing, context
//! initialization, error reporting, exit codes and rendering. Nothing below it prints.
//!
//! ## Testing Approach
//!
//! - Library behavior is tested in `medrecapp`.
//! - Rendering helpers have unit tests next to them.
//! - `tests/` drives the real binary against a temporary data directory with
//!   `assert_cmd`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
