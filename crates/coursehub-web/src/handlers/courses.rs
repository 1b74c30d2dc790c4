//! Handlers for publishing a course.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/create` | Upload form; needs `CreateCourse` |
//! | `POST` | `/create` | Multipart: `title`, `price`, `body`, `category`, `sub_category`, files `video`, `thumbnail` |
//!
//! Both files are checked before either is written, and the course row is
//! only inserted once both files are on disk. If a later step fails, the
//! files this request wrote are removed again.

use axum::{
  Json,
  extract::{Multipart, State},
  response::{IntoResponse, Redirect, Response},
};
use coursehub_core::{
  authz::Capability,
  course::{NewCourse, Price},
  store::MarketStore,
};
use tracing::{debug, info};

use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  uploads::{self, Upload},
  views::FormView,
};

/// Category used when the form leaves one blank.
pub const DEFAULT_CATEGORY: &str = "general";

/// `GET /create`
pub async fn create_page<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<FormView>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  user.require(Capability::CreateCourse)?;
  Ok(Json(FormView::create("", state.config.max_upload_bytes)))
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CourseForm {
  title:        Option<String>,
  price:        Option<String>,
  body:         Option<String>,
  category:     Option<String>,
  sub_category: Option<String>,
  video:        Option<Upload>,
  thumbnail:    Option<Upload>,
}

impl CourseForm {
  async fn read(multipart: &mut Multipart) -> Result<Self, Error> {
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };
      match name.as_str() {
        "video" | "thumbnail" => {
          let file_name = field.file_name().unwrap_or_default().to_owned();
          let data = field.bytes().await?;
          let upload = Some(Upload { file_name, data });
          if name == "video" {
            form.video = upload;
          } else {
            form.thumbnail = upload;
          }
        }
        "title" => form.title = Some(field.text().await?),
        "price" => form.price = Some(field.text().await?),
        "body" => form.body = Some(field.text().await?),
        "category" => form.category = Some(field.text().await?),
        "sub_category" => form.sub_category = Some(field.text().await?),
        other => debug!(field = other, "ignoring unknown multipart field"),
      }
    }
    Ok(form)
  }
}

fn category_or_default(value: Option<String>) -> String {
  value
    .filter(|v| !v.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /create`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  mut multipart: Multipart,
) -> Result<Response, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  user.require(Capability::CreateCourse)?;

  let form = CourseForm::read(&mut multipart).await?;
  let limit = state.config.max_upload_bytes;
  let invalid = |message: String| Error::Validation(FormView::create(message, limit));

  let title = form.title.as_deref().unwrap_or_default().trim().to_owned();
  if title.is_empty() {
    return Err(invalid("Please give the course a title.".into()));
  }
  let price: Price = form
    .price
    .as_deref()
    .unwrap_or_default()
    .parse()
    .map_err(|e: coursehub_core::Error| invalid(e.to_string()))?;

  let video = uploads::accept("video", form.video).map_err(|e| invalid(e.to_string()))?;
  let thumbnail =
    uploads::accept("thumbnail", form.thumbnail).map_err(|e| invalid(e.to_string()))?;

  let dir = &state.config.upload_dir;
  uploads::save(dir, &video).await?;
  if let Err(e) = uploads::save(dir, &thumbnail).await {
    uploads::discard(dir, &[&video]).await;
    return Err(e.into());
  }

  let created = state
    .store
    .create_course(NewCourse {
      instructor_id: user.identity.id,
      title,
      description: form.body.unwrap_or_default(),
      video_path: video.name.clone(),
      thumbnail_path: thumbnail.name.clone(),
      category: category_or_default(form.category),
      sub_category: category_or_default(form.sub_category),
      price,
    })
    .await;
  let course = match created {
    Ok(course) => course,
    Err(e) => {
      uploads::discard(dir, &[&video, &thumbnail]).await;
      return Err(Error::Store(Box::new(e)));
    }
  };

  info!(
    course_id = course.id,
    instructor_id = course.instructor_id,
    "course created"
  );
  Ok(Redirect::to(&format!("/course/{}", course.id)).into_response())
}
