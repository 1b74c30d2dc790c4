//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings, calendar dates
//! as `YYYY-MM-DD`, roles as their integer code and prices as integer cents.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use coursehub_core::{
  authz::Role,
  course::{Course, Price},
  identity::Identity,
  session::Session,
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Identity ────────────────────────────────────────────────────────────────

pub const IDENTITY_COLUMNS: &str =
  "id, full_name, email, password_hash, date_joined, role";

/// Raw values read directly from an `identities` row.
pub struct RawIdentity {
  pub id:            i64,
  pub full_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub date_joined:   String,
  pub role:          i64,
}

impl RawIdentity {
  /// Row mapper for queries selecting [`IDENTITY_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      full_name:     row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      date_joined:   row.get(4)?,
      role:          row.get(5)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    let role = Role::try_from(self.role).map_err(|e| Error::CorruptRow {
      table:  "identities",
      id:     self.id.to_string(),
      detail: e.to_string(),
    })?;
    Ok(Identity {
      id: self.id,
      full_name: self.full_name,
      email: self.email,
      password_hash: self.password_hash,
      date_joined: decode_date(&self.date_joined)?,
      role,
    })
  }
}

// ─── Course ──────────────────────────────────────────────────────────────────

pub const COURSE_COLUMNS: &str = "id, instructor_id, title, description, \
                                  video_path, thumbnail_path, category, \
                                  sub_category, last_updated, price_cents";

/// Raw values read directly from a `courses` row.
pub struct RawCourse {
  pub id:             i64,
  pub instructor_id:  i64,
  pub title:          String,
  pub description:    String,
  pub video_path:     String,
  pub thumbnail_path: String,
  pub category:       String,
  pub sub_category:   String,
  pub last_updated:   String,
  pub price_cents:    i64,
}

impl RawCourse {
  /// Row mapper for queries selecting [`COURSE_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      instructor_id:  row.get(1)?,
      title:          row.get(2)?,
      description:    row.get(3)?,
      video_path:     row.get(4)?,
      thumbnail_path: row.get(5)?,
      category:       row.get(6)?,
      sub_category:   row.get(7)?,
      last_updated:   row.get(8)?,
      price_cents:    row.get(9)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      id:             self.id,
      instructor_id:  self.instructor_id,
      title:          self.title,
      description:    self.description,
      video_path:     self.video_path,
      thumbnail_path: self.thumbnail_path,
      category:       self.category,
      sub_category:   self.sub_category,
      last_updated:   decode_date(&self.last_updated)?,
      price:          Price::from_cents(self.price_cents)?,
    })
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub const SESSION_COLUMNS: &str =
  "token_hash, identity_id, created_at, expires_at";

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub token_hash:  String,
  pub identity_id: i64,
  pub created_at:  String,
  pub expires_at:  String,
}

impl RawSession {
  /// Row mapper for queries selecting [`SESSION_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      token_hash:  row.get(0)?,
      identity_id: row.get(1)?,
      created_at:  row.get(2)?,
      expires_at:  row.get(3)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      created_at:  decode_dt(&self.created_at)?,
      expires_at:  decode_dt(&self.expires_at)?,
      token_hash:  self.token_hash,
      identity_id: self.identity_id,
    })
  }
}
