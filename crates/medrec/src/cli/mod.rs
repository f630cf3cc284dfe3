//! # CLI Behavior
//!
//! This is **one possible UI client** for medrec, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Command Groups
//!
//! - `medrec patient ...`: register, list, show, search, update, admit, discharge, delete
//! - `medrec appointment ...`: schedule, list, status changes, reschedule, delete
//! - `medrec bill ...`: issue, pay, list, delete
//! - `medrec config`: show resolved settings, generate a template, read one key
//! - `medrec doctor`: report load problems and references to missing patients
//!
//! Running `medrec` with no arguments lists patients.
//!
//! ## Guarded Deletes
//!
//! `medrec patient delete P104` refuses while appointments or bills still point at the
//! patient, and says how many of each. `medrec patient check P104` asks the same question
//! without deleting anything.
//!
//! ## Output
//!
//! Text by default. `--output json` prints the same data as JSON for scripting; messages
//! are included alongside the records.
//!
//! ## Module Structure
//!
//! - `commands`: Context setup, logging, and dispatch
//! - `handlers`: Per-group handlers that call the API
//! - `render`: Output formatting (tables, details, messages)
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling

mod commands;
mod handlers;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
