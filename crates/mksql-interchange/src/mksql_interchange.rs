//! mksql interchange - annotated CSV sources into a SQLite database
//!
//! # Architecture
//!
//! ```text
//! <table>.csv → header grammar → CREATE TABLE / CREATE INDEX → rows → Store
//!                                                              ↑
//!                                        foreign keys resolved against
//!                                        tables loaded earlier
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let config = LoadConfig::default().with_database("ares.sqlite");
//! let report = build_database(&config)?;
//! ```

mod config;
mod csv_import;
mod orchestrator;
mod views;

pub use config::{
    DEFAULT_DATA_DIR, DEFAULT_DATABASE, DEFAULT_TABLES, LoadConfig, TableSource, ViewDefinition,
};
pub use csv_import::{CsvTableLoader, TableReport};
pub use orchestrator::{LoadReport, Orchestrator, build_database};
pub use views::default_views;
