//! Registered users.

use chrono::NaiveDate;
use serde::Serialize;

use crate::authz::Role;

/// A registered account.
///
/// The password hash never leaves the process: it is skipped when the
/// identity is serialized into a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
  pub id:            i64,
  pub full_name:     String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub date_joined:   NaiveDate,
  pub role:          Role,
}

/// Input for [`MarketStore::create_identity`](crate::store::MarketStore::create_identity).
/// `date_joined` is set by the store.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub full_name:     String,
  /// Stored exactly as entered; lookups are case-sensitive.
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
}
