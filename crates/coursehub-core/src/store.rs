//! The `MarketStore` trait.
//!
//! Implemented by storage backends (e.g. `coursehub-store-sqlite`). The web
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  course::{Course, NewCourse},
  identity::{Identity, NewIdentity},
  session::{NewSession, Session},
};

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// Result of an insert guarded by a uniqueness constraint.
///
/// A conflict is an expected outcome, not a storage fault, so it is kept out
/// of the error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
  Inserted(T),
  Conflict,
}

impl<T> InsertOutcome<T> {
  pub fn inserted(self) -> Option<T> {
    match self {
      InsertOutcome::Inserted(value) => Some(value),
      InsertOutcome::Conflict => None,
    }
  }

  pub fn is_conflict(&self) -> bool { matches!(self, InsertOutcome::Conflict) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a CourseHub storage backend.
///
/// Identities and courses are append-only. Sessions are the only records
/// that get deleted.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait MarketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Persist a new identity. Returns [`InsertOutcome::Conflict`] when the
  /// email is already registered; nothing is written in that case.
  fn create_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<InsertOutcome<Identity>, Self::Error>> + Send + '_;

  fn get_identity(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Exact, case-sensitive email lookup.
  fn find_identity_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;

  fn count_identities(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// Every course, ordered by id.
  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Courses owned by `instructor_id`, ordered by id.
  ///
  /// `None` or a non-positive id yields an empty list, never every course.
  fn list_courses_by_instructor(
    &self,
    instructor_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Case-sensitive exact match on `category`.
  fn list_courses_by_category<'a>(
    &'a self,
    category: &'a str,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + 'a;

  /// Case-sensitive exact match on `sub_category`.
  fn list_courses_by_sub_category<'a>(
    &'a self,
    sub_category: &'a str,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a session by token digest. Expired rows are still returned;
  /// callers check [`Session::is_live_at`].
  fn find_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Returns `true` if a row was deleted.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete every session whose `expires_at` is at or before `now`.
  /// Returns the number of rows removed.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
