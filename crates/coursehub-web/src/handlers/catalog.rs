//! Handlers for browsing the course catalog.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Every course, paginated with `?page=` |
//! | `GET`  | `/get-courses-category/{category}` | Exact, case-sensitive match |
//! | `GET`  | `/get-courses-sub-category/{sub_category}` | Exact, case-sensitive match |
//! | `GET`  | `/course/{id}` | 404 if not found |
//! | `GET`  | `/manage_courses` | The signed-in instructor's own courses |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use coursehub_core::{
  authz::Capability,
  course::Course,
  identity::Identity,
  page::paginate,
  store::MarketStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{CurrentUser, Viewer},
  error::Error,
  views::{CatalogView, CourseView, ManageView},
};

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub page: Option<String>,
}

impl PageParams {
  /// Requested page. Input that is not an integer means the first page.
  /// Negative numbers map to page 0 and numbers too large for `usize` to
  /// the last representable page, so both come back empty.
  pub fn number(&self) -> usize {
    let Some(raw) = self.page.as_deref().map(str::trim) else {
      return 1;
    };
    let (negative, digits) = match raw.strip_prefix('-') {
      Some(rest) => (true, rest),
      None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return 1;
    }
    if negative {
      return 0;
    }
    digits.parse().unwrap_or(usize::MAX)
  }
}

fn listing<S>(
  state: &AppState<S>,
  view: &'static str,
  viewer: Option<Identity>,
  filter: Option<String>,
  courses: Vec<Course>,
  params: &PageParams,
) -> Json<CatalogView>
where
  S: MarketStore,
{
  Json(CatalogView {
    view,
    viewer,
    filter,
    page: paginate(courses, params.number(), state.config.page_size),
  })
}

/// `GET /[?page=<n>]`
pub async fn home<S>(
  State(state): State<AppState<S>>,
  Viewer(viewer): Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<CatalogView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let courses = state
    .store
    .list_courses()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let view = if viewer.is_some() { "dashboard" } else { "index" };
  Ok(listing(&state, view, viewer, None, courses, &params))
}

/// `GET /get-courses-category/{category}[?page=<n>]`
pub async fn by_category<S>(
  State(state): State<AppState<S>>,
  Viewer(viewer): Viewer,
  Path(category): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<CatalogView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let courses = state
    .store
    .list_courses_by_category(&category)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(listing(&state, "dashboard", viewer, Some(category), courses, &params))
}

/// `GET /get-courses-sub-category/{sub_category}[?page=<n>]`
pub async fn by_sub_category<S>(
  State(state): State<AppState<S>>,
  Viewer(viewer): Viewer,
  Path(sub_category): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<CatalogView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let courses = state
    .store
    .list_courses_by_sub_category(&sub_category)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(listing(&state, "dashboard", viewer, Some(sub_category), courses, &params))
}

/// `GET /course/{id}`
pub async fn course<S>(
  State(state): State<AppState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<i64>,
) -> Result<Json<CourseView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let course = state
    .store
    .get_course(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound)?;
  Ok(Json(CourseView {
    view: "course",
    viewer,
    course,
  }))
}

/// `GET /manage_courses`
pub async fn manage<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<ManageView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  user.require(Capability::ManageCourses)?;
  let courses = state
    .store
    .list_courses_by_instructor(Some(user.identity.id))
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(ManageView {
    view: "manage_courses",
    viewer: user.identity,
    courses,
  }))
}
