//! # Medrec Architecture
//!
//! Medrec is a **UI-agnostic patient-records library**: patients, their appointments,
//! bills and medical records, plus a ledger of payments, kept in memory and mirrored to
//! plain CSV files. The `medrec` binary is one
//! client of it, not the application itself.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - The single entry point: RecordsApi                       │
//! │  - Cross-kind rules: patient must exist, guarded deletes    │
//! │  - Returns owned snapshots and Outcome<T>                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Service Layer (services/*.rs)       Dependency Checker     │
//! │  - One service per record kind       (deps.rs)              │
//! │  - Validation, defaults, messages                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, codec/)                             │
//! │  - RecordStore: ordered collection + id allocation          │
//! │  - Codec: CSV text with quote escaping, tolerant decoding   │
//! │  - StorageBackend: FsBackend (production), MemBackend       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<Outcome<T>>`)
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! ## Durability
//!
//! Every mutation is persisted before it returns. There is no save-on-exit: if the
//! process dies right after a call returns `Ok`, the change is on disk. If the write
//! fails, memory is left untouched and the error is returned.
//!
//! ## Testing Strategy
//!
//! 1. **Model, codec, store** (`model/`, `codec/`, `store/`): unit tests next to the code.
//! 2. **Services and API**: unit tests against `MemBackend`, exercising the real codec.
//! 3. **Filesystem behavior** (`tests/`): backups, atomic writes and reload, with `tempfile`.
//!
//! ## Module Overview
//!
//! - [`model`]: record types and the `Record` trait
//! - [`ids`]: identifier allocation
//! - [`codec`]: CSV encoding and decoding with diagnostics
//! - [`store`]: record stores, tables and storage backends
//! - [`deps`]: the dependency checker guarding patient deletes
//! - [`services`]: per-kind business rules
//! - [`api`]: the facade
//! - [`config`], [`init`]: configuration and the composition root

pub mod api;
pub mod codec;
pub mod config;
pub mod deps;
pub mod error;
pub mod ids;
pub mod init;
pub mod model;
pub mod services;
pub mod store;
