//! HTTP layer for the CourseHub marketplace.
//!
//! Exposes an axum [`Router`] serving registration, login, the course catalog
//! and the course upload path, backed by any [`MarketStore`]. Pages are
//! answered as JSON view models (see [`views`]).

pub mod auth;
pub mod error;
pub mod handlers;
pub mod password;
pub mod session;
pub mod uploads;
pub mod views;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::get,
};
use coursehub_core::{page::DEFAULT_PAGE_SIZE, store::MarketStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{account, catalog, courses, display, pages};
use session::SessionKeys;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `COURSEHUB_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_database_path")]
  pub database_path:     PathBuf,
  /// Flat directory holding every uploaded video and thumbnail.
  #[serde(default = "default_upload_dir")]
  pub upload_dir:        PathBuf,
  /// HMAC key for session cookies.
  pub session_secret:    String,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: u32,
  /// Mark the session cookie `Secure`; enable behind TLS.
  #[serde(default)]
  pub cookie_secure:     bool,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes:  usize,
  #[serde(default = "default_page_size")]
  pub page_size:         usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("coursehub.sqlite3") }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_session_ttl_hours() -> u32 { 24 * 14 }
fn default_max_upload_bytes() -> usize { 100 * 1024 * 1024 }
fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

impl ServerConfig {
  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(i64::from(self.session_ttl_hours))
  }

  #[cfg(test)]
  pub(crate) fn for_tests(secret: &str, upload_dir: PathBuf) -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      database_path: PathBuf::from(":memory:"),
      upload_dir,
      session_secret: secret.to_string(),
      session_ttl_hours: default_session_ttl_hours(),
      cookie_secure: false,
      max_upload_bytes: default_max_upload_bytes(),
      page_size: default_page_size(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: MarketStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionKeys>,
}

impl<S: MarketStore> AppState<S> {
  /// Build state from an opened store, deriving the cookie signer from
  /// `config`. Fails if the session secret is unusable.
  pub fn new(store: S, config: ServerConfig) -> Result<Self, Error> {
    let sessions = SessionKeys::new(
      &config.session_secret,
      config.session_ttl(),
      config.cookie_secure,
    )?;
    Ok(Self {
      store:    Arc::new(store),
      config:   Arc::new(config),
      sessions: Arc::new(sessions),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the marketplace.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    .route("/",                                        get(catalog::home::<S>))
    .route("/login",                                   get(account::login_page).post(account::login::<S>))
    .route("/logout",                                  get(account::logout::<S>).post(account::logout::<S>))
    .route("/register",                                get(account::register_page).post(account::register::<S>))
    .route("/create",                                  get(courses::create_page::<S>).post(courses::create::<S>))
    .route("/display/{*file_name}",                    get(display::handler::<S>))
    .route("/get-courses-category/{category}",         get(catalog::by_category::<S>))
    .route("/get-courses-sub-category/{sub_category}", get(catalog::by_sub_category::<S>))
    .route("/course/{id}",                             get(catalog::course::<S>))
    .route("/manage_courses",                          get(catalog::manage::<S>))
    .route("/contact",                                 get(pages::contact))
    .route("/about",                                   get(pages::about))
    .route("/health",                                  get(|| async { "ok" }))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
