// SQLite project store
// One row per project; messages and agent steps are stored as JSON text

mod db;
mod error;
mod queries;
mod records;
mod schema;

// Public API
pub use db::Database;
pub use error::{Error, Result};
pub use records::ProjectRecord;
pub use schema::SCHEMA_VERSION;
