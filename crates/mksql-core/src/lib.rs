//! mksql Core - schema inference and value handling for annotated CSV tables
//!
//! This crate holds everything that does not touch a file or a database
//! driver:
//!
//! - `header` - the `name:type:constraints:table[column]` header grammar
//! - `coerce` - raw cell to store value conversion
//! - `resolve` - foreign-key lookup against a [`Store`]
//! - `ddl` / `directive` - `CREATE TABLE`, `INSERT` and `CREATE INDEX` generation
//! - `Store` - trait implemented by the database driver

pub mod coerce;
pub mod ddl;
pub mod directive;
mod error;
pub mod header;
pub mod identifier;
pub mod resolve;
mod store;
mod types;

pub use coerce::{Coerced, coerce};
pub use directive::{DIRECTIVE_MARKER, Directive, is_directive};
pub use error::*;
pub use header::{parse_header, parse_header_cell};
pub use resolve::ForeignKeyResolver;
pub use store::*;
pub use types::*;
