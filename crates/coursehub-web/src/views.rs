//! JSON view models.
//!
//! Each page is answered with a JSON document whose `view` field names the
//! template it stands in for, next to the data that template renders.

use coursehub_core::{authz::Role, course::Course, identity::Identity, page::Page};
use serde::Serialize;
use serde_json::{Map, Value, json};

// ─── Forms ───────────────────────────────────────────────────────────────────

/// A form page, optionally carrying a message about the last submission.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
  pub view:           &'static str,
  pub output_message: String,
  #[serde(flatten)]
  pub extra:          Map<String, Value>,
}

impl FormView {
  fn new(view: &'static str, message: impl Into<String>) -> Self {
    Self {
      view,
      output_message: message.into(),
      extra: Map::new(),
    }
  }

  fn with(mut self, key: &str, value: Value) -> Self {
    self.extra.insert(key.to_owned(), value);
    self
  }

  pub fn login(message: impl Into<String>) -> Self { Self::new("login", message) }

  /// The register form lists every account type the user may pick.
  pub fn register(message: impl Into<String>) -> Self {
    let roles: Vec<Value> = Role::ALL
      .iter()
      .map(|role| json!({ "code": role.code(), "label": role.label() }))
      .collect();
    Self::new("register", message).with("roles", Value::Array(roles))
  }

  pub fn create(message: impl Into<String>, max_upload_bytes: usize) -> Self {
    Self::new("create", message)
      .with("allowed_extensions", json!(crate::uploads::ALLOWED_EXTENSIONS))
      .with("max_upload_bytes", json!(max_upload_bytes))
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A paginated course listing.
#[derive(Debug, Serialize)]
pub struct CatalogView {
  pub view:   &'static str,
  pub viewer: Option<Identity>,
  /// The category or sub-category being browsed, if any.
  pub filter: Option<String>,
  #[serde(flatten)]
  pub page:   Page<Course>,
}

#[derive(Debug, Serialize)]
pub struct CourseView {
  pub view:   &'static str,
  pub viewer: Option<Identity>,
  pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct ManageView {
  pub view:    &'static str,
  pub viewer:  Identity,
  pub courses: Vec<Course>,
}

/// Pages with no data of their own.
#[derive(Debug, Serialize)]
pub struct StaticView {
  pub view:   &'static str,
  pub viewer: Option<Identity>,
}
