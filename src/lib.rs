//! A tiny in-memory student record store.
//!
//! Records live in an ordered [`Table`] that assigns ids, answers linear-scan
//! lookups and aggregate queries, and saves or restores its whole state as a
//! single binary snapshot file.

pub mod config;
pub use config::Config;

pub mod record;
pub use record::Record;

pub mod result;
pub use result::{DbResult, StudentBaseError};

pub mod shell;
pub use shell::{MenuOption, Shell};

pub mod snapshot;

pub mod table;
pub use table::Table;

mod encoding;
