//! [`SqliteStore`]: the SQLite implementation of [`MarketStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;

use coursehub_core::{
  course::{Course, NewCourse},
  identity::{Identity, NewIdentity},
  session::{NewSession, Session},
  store::{InsertOutcome, MarketStore},
};

use crate::{
  Result,
  encode::{
    COURSE_COLUMNS, IDENTITY_COLUMNS, RawCourse, RawIdentity, RawSession,
    SESSION_COLUMNS, encode_date, encode_dt,
  },
  schema::SCHEMA,
};

/// Whether a failed statement tripped a UNIQUE constraint.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CourseHub store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a course listing with an optional single-parameter `WHERE` clause.
  async fn query_courses(
    &self,
    clause: &'static str,
    param: Option<Value>,
  ) -> Result<Vec<Course>> {
    let raws: Vec<RawCourse> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses {clause} ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param), RawCourse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }
}

// ─── MarketStore impl ────────────────────────────────────────────────────────

impl MarketStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────

  async fn create_identity(
    &self,
    input: NewIdentity,
  ) -> Result<InsertOutcome<Identity>> {
    let date_joined = Utc::now().date_naive();
    let date_str = encode_date(date_joined);
    let role_code = input.role.code();
    let (full_name, email, password_hash) =
      (input.full_name.clone(), input.email.clone(), input.password_hash.clone());

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO identities (full_name, email, password_hash, date_joined, role)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![full_name, email, password_hash, date_str, role_code],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      debug!(email = %input.email, "identity insert hit the unique email constraint");
      return Ok(InsertOutcome::Conflict);
    };

    Ok(InsertOutcome::Inserted(Identity {
      id,
      full_name: input.full_name,
      email: input.email,
      password_hash: input.password_hash,
      date_joined,
      role: input.role,
    }))
  }

  async fn get_identity(&self, id: i64) -> Result<Option<Identity>> {
    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = ?1"),
              rusqlite::params![id],
              RawIdentity::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>> {
    let email = email.to_owned();
    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = ?1"),
              rusqlite::params![email],
              RawIdentity::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn count_identities(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM identities", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  // ── Courses ───────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let last_updated = Utc::now().date_naive();
    let date_str = encode_date(last_updated);
    let row = input.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses
             (instructor_id, title, description, video_path, thumbnail_path,
              category, sub_category, last_updated, price_cents)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.instructor_id,
            row.title,
            row.description,
            row.video_path,
            row.thumbnail_path,
            row.category,
            row.sub_category,
            date_str,
            row.price.cents(),
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Course {
      id,
      instructor_id: input.instructor_id,
      title: input.title,
      description: input.description,
      video_path: input.video_path,
      thumbnail_path: input.thumbnail_path,
      category: input.category,
      sub_category: input.sub_category,
      last_updated,
      price: input.price,
    })
  }

  async fn get_course(&self, id: i64) -> Result<Option<Course>> {
    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
              rusqlite::params![id],
              RawCourse::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    self.query_courses("", None).await
  }

  async fn list_courses_by_instructor(
    &self,
    instructor_id: Option<i64>,
  ) -> Result<Vec<Course>> {
    match instructor_id {
      Some(id) if id > 0 => {
        self
          .query_courses("WHERE instructor_id = ?1", Some(Value::Integer(id)))
          .await
      }
      _ => Ok(Vec::new()),
    }
  }

  async fn list_courses_by_category(&self, category: &str) -> Result<Vec<Course>> {
    self
      .query_courses("WHERE category = ?1", Some(Value::Text(category.to_owned())))
      .await
  }

  async fn list_courses_by_sub_category(
    &self,
    sub_category: &str,
  ) -> Result<Vec<Course>> {
    self
      .query_courses(
        "WHERE sub_category = ?1",
        Some(Value::Text(sub_category.to_owned())),
      )
      .await
  }

  // ── Sessions ──────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    let created_at = Utc::now();
    let created_str = encode_dt(created_at);
    let expires_str = encode_dt(input.expires_at);
    let token_hash = input.token_hash.clone();
    let identity_id = input.identity_id;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, identity_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, identity_id, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Session {
      token_hash: input.token_hash,
      identity_id,
      created_at,
      expires_at: input.expires_at,
    })
  }

  async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
    let token_hash = token_hash.to_owned();
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token_hash = ?1"),
              rusqlite::params![token_hash],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, token_hash: &str) -> Result<bool> {
    let token_hash = token_hash.to_owned();
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);
    let purged: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(purged as u64)
  }
}
