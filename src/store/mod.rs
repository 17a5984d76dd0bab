//! Persistence layer: trait, migrations, and the libSQL backend.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{ContactFilter, ContactPage, Database};
