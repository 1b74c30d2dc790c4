//! Server-side session records.
//!
//! The raw session token only ever lives in the client's cookie. The store
//! keeps its SHA-256 digest, so a leaked database does not leak live tokens.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub token_hash:  String,
  pub identity_id: i64,
  pub created_at:  DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
}

impl Session {
  pub fn is_live_at(&self, now: DateTime<Utc>) -> bool { self.expires_at > now }
}

/// Input for [`MarketStore::create_session`](crate::store::MarketStore::create_session).
/// `created_at` is set by the store.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub token_hash:  String,
  pub identity_id: i64,
  pub expires_at:  DateTime<Utc>,
}
