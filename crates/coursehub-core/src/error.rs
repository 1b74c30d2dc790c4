use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("unknown role code: {0}")]
  UnknownRole(i64),

  #[error("invalid price {input:?}: {reason}")]
  InvalidPrice { input: String, reason: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
