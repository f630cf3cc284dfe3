//! # Storage Layer
//!
//! Records live in memory and are mirrored to one flat file per kind. The layer is split
//! in three so each piece can be tested on its own:
//!
//! 1. [`RecordStore`]: an ordered, keyed collection of one kind. Knows how to assign
//!    identifiers and apply create/update/remove. Does no I/O.
//! 2. [`StorageBackend`]: raw text I/O of one file per kind. [`FsBackend`] writes real
//!    files, [`MemBackend`] keeps them in a map for tests.
//! 3. [`Table`]: a record store bound to the codec and a backend.
//!
//! ## Write Protocol
//!
//! Every mutation goes through [`Table::transact`]:
//!
//! 1. Clone the current store and apply the change to the clone.
//! 2. Encode the whole clone and hand the text to the backend.
//! 3. Only when the backend reports success, replace the in-memory store with the clone.
//!
//! A failure at any step leaves both memory and the file as they were. There is no
//! deferred or shutdown-time save: once a mutating call returns `Ok`, the file on disk
//! reflects it.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── medrec.toml           # Optional config overrides
//! ├── patients.csv
//! ├── patients.csv.bak      # Previous version, refreshed on every save
//! ├── appointments.csv
//! ├── appointments.csv.bak
//! ├── bills.csv
//! ├── bills.csv.bak
//! ├── medical_records.csv
//! ├── medical_records.csv.bak
//! ├── payments.csv
//! └── payments.csv.bak
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod record_store;
pub mod table;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use record_store::RecordStore;
pub use table::Table;
