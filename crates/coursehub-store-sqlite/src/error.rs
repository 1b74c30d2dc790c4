//! Error type for `coursehub-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] coursehub_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row holds a value no domain type can represent.
  #[error("corrupt {table} row {id}: {detail}")]
  CorruptRow {
    table:  &'static str,
    id:     String,
    detail: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
