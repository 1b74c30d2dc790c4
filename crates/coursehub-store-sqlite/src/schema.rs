//! SQL schema for the CourseHub SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Accounts are created on registration and never updated or deleted.
CREATE TABLE IF NOT EXISTS identities (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,   -- compared byte-for-byte
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    date_joined   TEXT NOT NULL,          -- YYYY-MM-DD, UTC
    role          INTEGER NOT NULL DEFAULT 1 CHECK (role BETWEEN 0 AND 3)
);

-- instructor_id is not a foreign key.
CREATE TABLE IF NOT EXISTS courses (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    instructor_id  INTEGER NOT NULL,
    title          TEXT NOT NULL,
    description    TEXT NOT NULL,
    video_path     TEXT NOT NULL,
    thumbnail_path TEXT NOT NULL,
    category       TEXT NOT NULL,
    sub_category   TEXT NOT NULL,
    last_updated   TEXT NOT NULL,         -- YYYY-MM-DD, UTC
    price_cents    INTEGER NOT NULL DEFAULT 0 CHECK (price_cents >= 0)
);

-- Timestamps use a fixed-width RFC 3339 form so text comparison orders them.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,         -- sha256 hex of the cookie token
    identity_id INTEGER NOT NULL REFERENCES identities(id),
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS courses_instructor_idx   ON courses(instructor_id);
CREATE INDEX IF NOT EXISTS courses_category_idx     ON courses(category);
CREATE INDEX IF NOT EXISTS courses_sub_category_idx ON courses(sub_category);
CREATE INDEX IF NOT EXISTS sessions_expires_idx     ON sessions(expires_at);

PRAGMA user_version = 1;
";
