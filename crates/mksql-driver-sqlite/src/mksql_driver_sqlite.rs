//! SQLite store implementation

mod connection;

pub use connection::SqliteStore;
