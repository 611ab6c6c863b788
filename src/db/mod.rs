mod connection;
mod migrations;
mod queries;

pub use connection::Database;
pub use queries::DEFAULT_RETENTION_DAYS;
