//! Router tests: full requests through [`router`] against an in-memory store
//! and a temporary upload directory.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use chrono::{DateTime, Duration, Utc};
use coursehub_core::{
  course::{Course, NewCourse},
  identity::{Identity, NewIdentity},
  session::{NewSession, Session},
  store::{InsertOutcome, MarketStore},
};
use coursehub_store_sqlite::SqliteStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{
  AppState, ServerConfig,
  handlers::account::{DUPLICATE_EMAIL, REGISTRATION_FAILED},
  router,
  session::{SESSION_COOKIE, hash_token},
};

struct Harness<S: MarketStore = SqliteStore> {
  state:   AppState<S>,
  uploads: TempDir,
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  harness_with(store, |_| {})
}

fn harness_with<S: MarketStore>(
  store: S,
  configure: impl FnOnce(&mut ServerConfig),
) -> Harness<S> {
  let uploads = tempfile::tempdir().unwrap();
  let mut config =
    ServerConfig::for_tests("router-test-secret", uploads.path().to_path_buf());
  configure(&mut config);
  Harness {
    state: AppState::new(store, config).unwrap(),
    uploads,
  }
}

impl<S> Harness<S>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  async fn send(&self, req: Request<Body>) -> Response {
    router(self.state.clone()).oneshot(req).await.unwrap()
  }

  async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    self.send(builder.body(Body::empty()).unwrap()).await
  }

  async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    self.send(builder.body(Body::from(body.to_string())).unwrap()).await
  }

  async fn post_multipart(&self, parts: &[Part<'_>], cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri("/create")
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      );
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    self
      .send(builder.body(Body::from(multipart_body(parts))).unwrap())
      .await
  }

  async fn register(&self, email: &str, password: &str, role: i64) -> Response {
    let body = format!(
      "full_name=Test+User&email={email}&password={password}&checkbox_auth={role}"
    );
    self.post_form("/register", &body, None).await
  }

  async fn login(&self, email: &str, password: &str) -> Response {
    self
      .post_form("/login", &format!("email={email}&password={password}"), None)
      .await
  }

  /// Register, log in and return the `Cookie` header value for the session.
  async fn signed_in(&self, email: &str, role: i64) -> String {
    let res = self.register(email, "hunter2", role).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let res = self.login(email, "hunter2").await;
    assert_eq!(location(&res), "/");
    session_cookie(&res).expect("login sets a session cookie")
  }

  fn upload_count(&self) -> usize {
    std::fs::read_dir(self.uploads.path()).unwrap().count()
  }
}

fn location(res: &Response) -> &str {
  res
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
}

/// `name=value` of the session cookie set by `res`, ready for a `Cookie`
/// header.
fn session_cookie(res: &Response) -> Option<String> {
  res
    .headers()
    .get_all(header::SET_COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .filter_map(|v| v.split(';').next())
    .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE}=")))
    .filter(|pair| pair.len() > SESSION_COOKIE.len() + 1)
    .map(str::to_owned)
}

async fn json(res: Response) -> Value {
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ─── Multipart ───────────────────────────────────────────────────────────────

const BOUNDARY: &str = "coursehub-test-boundary";

enum Part<'a> {
  Text(&'a str, &'a str),
  File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
  let mut body = Vec::new();
  for part in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match part {
      Part::Text(name, value) => {
        body.extend_from_slice(
          format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .as_bytes(),
        );
      }
      Part::File(name, file_name, data) => {
        body.extend_from_slice(
          format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
          )
          .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
      }
    }
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

fn course_parts<'a>(title: &'a str, thumbnail: &'a str) -> Vec<Part<'a>> {
  vec![
    Part::Text("title", title),
    Part::Text("price", "19.99"),
    Part::Text("body", "<p>Welcome aboard</p>"),
    Part::Text("category", "programming"),
    Part::Text("sub_category", "rust"),
    Part::File("video", "Intro Lesson.mp4", b"fake mp4 bytes"),
    Part::File("thumbnail", thumbnail, b"fake png bytes"),
  ]
}

fn seed_course(instructor_id: i64, title: &str, category: &str, sub: &str) -> NewCourse {
  NewCourse {
    instructor_id,
    title: title.into(),
    description: String::new(),
    video_path: "v.mp4".into(),
    thumbnail_path: "t.png".into(),
    category: category.into(),
    sub_category: sub.into(),
    price: "5".parse().unwrap(),
  }
}

// ─── Registration ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_redirects_to_login() {
  let h = harness().await;
  let res = h.register("ada@example.com", "pw", 1).await;
  assert_eq!(res.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&res), "/login");
  assert_eq!(h.state.store.count_identities().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_email_is_rejected_and_count_stays_one() {
  let h = harness().await;
  assert_eq!(h.register("ada@example.com", "pw", 1).await.status(), StatusCode::SEE_OTHER);

  let res = h.register("ada@example.com", "other", 2).await;
  assert_eq!(res.status(), StatusCode::CONFLICT);
  let body = json(res).await;
  assert_eq!(body["view"], "register");
  assert_eq!(body["output_message"], DUPLICATE_EMAIL);

  assert_eq!(h.state.store.count_identities().await.unwrap(), 1);
}

#[tokio::test]
async fn registration_validates_fields_and_role() {
  let h = harness().await;

  for body in [
    "full_name=&email=a@example.com&password=pw&checkbox_auth=1",
    "full_name=A&email=&password=pw&checkbox_auth=1",
    "full_name=A&email=not-an-email&password=pw&checkbox_auth=1",
    "full_name=A&email=a@example.com&password=&checkbox_auth=1",
    "full_name=A&email=a@example.com&password=pw",
    "full_name=A&email=a@example.com&password=pw&checkbox_auth=9",
    "full_name=A&email=a@example.com&password=pw&checkbox_auth=admin",
  ] {
    let res = h.post_form("/register", body, None).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(json(res).await["view"], "register");
  }
  assert_eq!(h.state.store.count_identities().await.unwrap(), 0);
}

#[tokio::test]
async fn register_page_lists_roles() {
  let h = harness().await;
  let body = json(h.get("/register", None).await).await;
  assert_eq!(body["roles"].as_array().unwrap().len(), 4);
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_success_sets_session() {
  let h = harness().await;
  h.register("ada@example.com", "hunter2", 1).await;

  let res = h.login("ada@example.com", "hunter2").await;
  assert_eq!(res.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&res), "/");
  let cookie = session_cookie(&res).unwrap();

  let body = json(h.get("/", Some(&cookie)).await).await;
  assert_eq!(body["view"], "dashboard");
  assert_eq!(body["viewer"]["email"], "ada@example.com");
  assert!(body["viewer"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_look_identical() {
  let h = harness().await;
  h.register("ada@example.com", "hunter2", 1).await;

  let wrong_password = h.login("ada@example.com", "nope").await;
  let unknown_email = h.login("nobody@example.com", "hunter2").await;

  for res in [&wrong_password, &unknown_email] {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(res), "/login");
    assert!(res.headers().get(header::SET_COOKIE).is_none());
  }
}

#[tokio::test]
async fn email_match_is_exact() {
  let h = harness().await;
  h.register("ada@example.com", "hunter2", 1).await;
  let res = h.login("ADA@example.com", "hunter2").await;
  assert_eq!(location(&res), "/login");
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn logout_ends_the_session() {
  let h = harness().await;
  let cookie = h.signed_in("ada@example.com", 2).await;

  let res = h.get("/logout", Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&res), "/login");
  let cleared = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  assert!(cleared.contains("Max-Age=0"));

  let res = h.get("/manage_courses", Some(&cookie)).await;
  assert_eq!(location(&res), "/login");
  assert_eq!(json(h.get("/", Some(&cookie)).await).await["view"], "index");
}

#[tokio::test]
async fn logout_also_accepts_post() {
  let h = harness().await;
  let cookie = h.signed_in("ada@example.com", 1).await;
  let res = h.post_form("/logout", "", Some(&cookie)).await;
  assert_eq!(location(&res), "/login");
  assert_eq!(json(h.get("/", Some(&cookie)).await).await["view"], "index");
}

#[tokio::test]
async fn expired_session_is_anonymous() {
  let h = harness().await;
  h.register("ada@example.com", "hunter2", 2).await;
  let identity = h
    .state
    .store
    .find_identity_by_email("ada@example.com")
    .await
    .unwrap()
    .unwrap();

  let issued = h.state.sessions.issue();
  h.state
    .store
    .create_session(NewSession {
      token_hash:  hash_token(&issued.token),
      identity_id: identity.id,
      expires_at:  Utc::now() - Duration::minutes(1),
    })
    .await
    .unwrap();

  let cookie = format!("{SESSION_COOKIE}={}", issued.cookie_value);
  let res = h.get("/manage_courses", Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn forged_cookie_is_anonymous() {
  let h = harness().await;
  let forged = format!("{SESSION_COOKIE}={}.{}", "a".repeat(64), "0".repeat(64));
  assert_eq!(json(h.get("/", Some(&forged)).await).await["view"], "index");
}

// ─── Authorization ────────────────────────────────────────────────────────────

#[tokio::test]
async fn gated_routes_redirect_anonymous_visitors() {
  let h = harness().await;
  for uri in ["/create", "/manage_courses", "/logout"] {
    let res = h.get(uri, None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
    assert_eq!(location(&res), "/login", "{uri}");
  }

  let res = h.post_multipart(&course_parts("t", "cover.png"), None).await;
  assert_eq!(location(&res), "/login");
  assert_eq!(h.upload_count(), 0);
}

#[tokio::test]
async fn students_are_forbidden_from_instructor_routes() {
  let h = harness().await;
  let cookie = h.signed_in("student@example.com", 1).await;

  assert_eq!(h.get("/create", Some(&cookie)).await.status(), StatusCode::FORBIDDEN);
  assert_eq!(
    h.get("/manage_courses", Some(&cookie)).await.status(),
    StatusCode::FORBIDDEN
  );

  let res = h
    .post_multipart(&course_parts("t", "cover.png"), Some(&cookie))
    .await;
  assert_eq!(res.status(), StatusCode::FORBIDDEN);
  assert_eq!(h.upload_count(), 0);
}

#[tokio::test]
async fn instructors_see_the_create_form() {
  let h = harness().await;
  let cookie = h.signed_in("teach@example.com", 2).await;
  let res = h.get("/create", Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::OK);
  assert_eq!(json(res).await["view"], "create");
}

// ─── Course creation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn instructor_publishes_a_course_end_to_end() {
  let h = harness().await;
  let alice = h.signed_in("alice@example.com", 2).await;
  let bob = h.signed_in("bob@example.com", 3).await;

  let res = h.post_multipart(&course_parts("Bob's course", "bob.png"), Some(&bob)).await;
  assert_eq!(location(&res), "/course/1");

  let res = h
    .post_multipart(&course_parts("Intro to Rust", "cover.png"), Some(&alice))
    .await;
  assert_eq!(res.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&res), "/course/2");

  // Anonymous catalog shows both courses.
  let catalog = json(h.get("/", None).await).await;
  assert_eq!(catalog["view"], "index");
  assert_eq!(catalog["total"], 2);
  let titles: Vec<&str> = catalog["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["title"].as_str().unwrap())
    .collect();
  assert_eq!(titles, ["Bob's course", "Intro to Rust"]);

  // Alice manages exactly her own course.
  let managed = json(h.get("/manage_courses", Some(&alice)).await).await;
  assert_eq!(managed["view"], "manage_courses");
  let courses = managed["courses"].as_array().unwrap();
  assert_eq!(courses.len(), 1);
  assert_eq!(courses[0]["title"], "Intro to Rust");
  assert_eq!(courses[0]["price"], "19.99");
  assert_eq!(courses[0]["video_path"], "Intro_Lesson.mp4");
  assert_eq!(courses[0]["thumbnail_path"], "cover.png");
  assert_eq!(courses[0]["category"], "programming");

  let detail = json(h.get("/course/2", None).await).await;
  assert_eq!(detail["course"]["description"], "<p>Welcome aboard</p>");

  assert!(h.uploads.path().join("Intro_Lesson.mp4").exists());
  assert!(h.uploads.path().join("cover.png").exists());
}

#[tokio::test]
async fn disallowed_extension_persists_nothing() {
  let h = harness().await;
  let cookie = h.signed_in("teach@example.com", 2).await;

  let res = h
    .post_multipart(&course_parts("Sneaky", "setup.exe"), Some(&cookie))
    .await;
  assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = json(res).await;
  assert_eq!(body["view"], "create");
  assert!(body["output_message"].as_str().unwrap().contains("invalid extension"));

  assert_eq!(h.upload_count(), 0);
  assert!(h.state.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_persists_nothing() {
  let h = harness().await;
  let cookie = h.signed_in("teach@example.com", 2).await;

  let parts = vec![
    Part::Text("title", "No thumbnail"),
    Part::Text("price", "1"),
    Part::File("video", "lesson.mp4", b"bytes"),
  ];
  let res = h.post_multipart(&parts, Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(json(res).await["output_message"], "No thumbnail file part");

  let parts = vec![
    Part::Text("title", "Empty selection"),
    Part::Text("price", "1"),
    Part::File("video", "", b""),
    Part::File("thumbnail", "cover.png", b"bytes"),
  ];
  let res = h.post_multipart(&parts, Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

  assert_eq!(h.upload_count(), 0);
  assert!(h.state.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn bad_price_or_title_persists_nothing() {
  let h = harness().await;
  let cookie = h.signed_in("teach@example.com", 2).await;

  for (title, price) in [("Priced wrong", "-5"), ("Too precise", "1.999"), ("", "10")] {
    let parts = vec![
      Part::Text("title", title),
      Part::Text("price", price),
      Part::File("video", "lesson.mp4", b"bytes"),
      Part::File("thumbnail", "cover.png", b"bytes"),
    ];
    let res = h.post_multipart(&parts, Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{title:?} {price:?}");
  }

  assert_eq!(h.upload_count(), 0);
  assert!(h.state.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_categories_default_to_general() {
  let h = harness().await;
  let cookie = h.signed_in("teach@example.com", 2).await;
  let parts = vec![
    Part::Text("title", "Uncategorised"),
    Part::Text("price", "0"),
    Part::Text("category", ""),
    Part::File("video", "lesson.mp4", b"bytes"),
    Part::File("thumbnail", "cover.png", b"bytes"),
  ];
  let res = h.post_multipart(&parts, Some(&cookie)).await;
  assert_eq!(location(&res), "/course/1");

  let course = h.state.store.get_course(1).await.unwrap().unwrap();
  assert_eq!(course.category, "general");
  assert_eq!(course.sub_category, "general");
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_paginates_by_page_size() {
  let h = harness().await;
  for i in 0..7 {
    h.state
      .store
      .create_course(seed_course(1, &format!("course {i}"), "general", "general"))
      .await
      .unwrap();
  }

  let first = json(h.get("/", None).await).await;
  assert_eq!(first["items"].as_array().unwrap().len(), 6);
  assert_eq!(first["page"], 1);
  assert_eq!(first["pages"], 2);

  let second = json(h.get("/?page=2", None).await).await;
  assert_eq!(second["items"].as_array().unwrap().len(), 1);
  assert_eq!(second["items"][0]["title"], "course 6");

  let past_end = json(h.get("/?page=3", None).await).await;
  assert!(past_end["items"].as_array().unwrap().is_empty());

  let junk = json(h.get("/?page=abc", None).await).await;
  assert_eq!(junk["page"], 1);
  assert_eq!(junk["items"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn negative_or_huge_page_numbers_are_empty() {
  let h = harness().await;
  for i in 0..7 {
    h.state
      .store
      .create_course(seed_course(1, &format!("course {i}"), "general", "general"))
      .await
      .unwrap();
  }

  for uri in ["/?page=-1", "/?page=99999999999999999999999"] {
    let res = h.get(uri, None).await;
    assert_eq!(res.status(), StatusCode::OK, "{uri}");
    let body = json(res).await;
    assert!(body["items"].as_array().unwrap().is_empty(), "{uri}");
    assert_eq!(body["total"], 7, "{uri}");
  }
}

#[tokio::test]
async fn category_routes_filter_exactly() {
  let h = harness().await;
  for (title, category, sub) in [
    ("a", "Music", "Guitar"),
    ("b", "music", "guitar"),
    ("c", "Music", "Piano"),
  ] {
    h.state
      .store
      .create_course(seed_course(1, title, category, sub))
      .await
      .unwrap();
  }

  let music = json(h.get("/get-courses-category/Music", None).await).await;
  assert_eq!(music["view"], "dashboard");
  assert_eq!(music["filter"], "Music");
  assert_eq!(music["total"], 2);

  let guitar = json(h.get("/get-courses-sub-category/guitar", None).await).await;
  assert_eq!(guitar["total"], 1);
  assert_eq!(guitar["items"][0]["title"], "b");
}

#[tokio::test]
async fn missing_course_is_not_found() {
  let h = harness().await;
  assert_eq!(h.get("/course/99", None).await.status(), StatusCode::NOT_FOUND);
}

// ─── Downloads ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn display_serves_uploads_as_attachments() {
  let h = harness().await;
  std::fs::write(h.uploads.path().join("notes.txt"), b"hello").unwrap();

  let res = h.get("/display/notes.txt", None).await;
  assert_eq!(res.status(), StatusCode::OK);
  assert_eq!(
    res.headers()[header::CONTENT_DISPOSITION],
    "attachment; filename=\"notes.txt\""
  );
  assert_eq!(
    res.headers()[header::CONTENT_TYPE],
    "text/plain; charset=utf-8"
  );
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"hello");
}

#[tokio::test]
async fn display_refuses_unsafe_or_missing_names() {
  let h = harness().await;
  std::fs::write(h.uploads.path().join("a_b.png"), b"png").unwrap();

  for uri in [
    "/display/missing.png",
    "/display/a/b.png",
    "/display/..%2Fa_b.png",
    "/display/.hidden",
  ] {
    assert_eq!(h.get(uri, None).await.status(), StatusCode::NOT_FOUND, "{uri}");
  }
}

// ─── Static ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn static_pages_and_health() {
  let h = harness().await;
  assert_eq!(json(h.get("/about", None).await).await["view"], "about");
  assert_eq!(json(h.get("/contact", None).await).await["view"], "contact");

  let res = h.get("/health", None).await;
  assert_eq!(res.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"ok");
}

// ─── Failure paths ────────────────────────────────────────────────────────────

/// SQLite-backed store whose identity or course inserts can be made to fail.
#[derive(Clone)]
struct FaultyStore {
  inner:           SqliteStore,
  fail_identities: bool,
  fail_courses:    bool,
}

impl FaultyStore {
  async fn new(fail_identities: bool, fail_courses: bool) -> Self {
    Self {
      inner: SqliteStore::open_in_memory().await.unwrap(),
      fail_identities,
      fail_courses,
    }
  }

  fn fault(table: &'static str) -> coursehub_store_sqlite::Error {
    coursehub_store_sqlite::Error::CorruptRow {
      table,
      id: "-".into(),
      detail: "disk unavailable".into(),
    }
  }
}

impl MarketStore for FaultyStore {
  type Error = coursehub_store_sqlite::Error;

  async fn create_identity(&self, input: NewIdentity) -> Result<InsertOutcome<Identity>, Self::Error> {
    if self.fail_identities {
      return Err(Self::fault("identities"));
    }
    self.inner.create_identity(input).await
  }
  async fn get_identity(&self, id: i64) -> Result<Option<Identity>, Self::Error> { self.inner.get_identity(id).await }
  async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, Self::Error> { self.inner.find_identity_by_email(email).await }
  async fn count_identities(&self) -> Result<u64, Self::Error> { self.inner.count_identities().await }
  async fn create_course(&self, input: NewCourse) -> Result<Course, Self::Error> {
    if self.fail_courses {
      return Err(Self::fault("courses"));
    }
    self.inner.create_course(input).await
  }
  async fn get_course(&self, id: i64) -> Result<Option<Course>, Self::Error> { self.inner.get_course(id).await }
  async fn list_courses(&self) -> Result<Vec<Course>, Self::Error> { self.inner.list_courses().await }
  async fn list_courses_by_instructor(&self, id: Option<i64>) -> Result<Vec<Course>, Self::Error> { self.inner.list_courses_by_instructor(id).await }
  async fn list_courses_by_category(&self, c: &str) -> Result<Vec<Course>, Self::Error> { self.inner.list_courses_by_category(c).await }
  async fn list_courses_by_sub_category(&self, s: &str) -> Result<Vec<Course>, Self::Error> { self.inner.list_courses_by_sub_category(s).await }
  async fn create_session(&self, input: NewSession) -> Result<Session, Self::Error> { self.inner.create_session(input).await }
  async fn find_session(&self, hash: &str) -> Result<Option<Session>, Self::Error> { self.inner.find_session(hash).await }
  async fn delete_session(&self, hash: &str) -> Result<bool, Self::Error> { self.inner.delete_session(hash).await }
  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, Self::Error> { self.inner.purge_expired_sessions(now).await }
}

#[tokio::test]
async fn registration_storage_fault_is_reported_on_the_form() {
  let h = harness_with(FaultyStore::new(true, false).await, |_| {});

  let res = h.register("ada@example.com", "hunter2", 2).await;
  assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json(res).await;
  assert_eq!(body["view"], "register");
  assert_eq!(body["output_message"], REGISTRATION_FAILED);

  // The server keeps answering.
  assert_eq!(h.get("/health", None).await.status(), StatusCode::OK);
  assert_eq!(h.state.store.count_identities().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_course_insert_removes_written_files() {
  let h = harness_with(FaultyStore::new(false, true).await, |_| {});
  let cookie = h.signed_in("teach@example.com", 2).await;

  let res = h
    .post_multipart(&course_parts("Doomed", "cover.png"), Some(&cookie))
    .await;
  assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

  assert_eq!(h.upload_count(), 0);
  assert!(h.state.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_anything_is_written() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let h = harness_with(store, |config| config.max_upload_bytes = 1024);
  let cookie = h.signed_in("teach@example.com", 2).await;

  let video = vec![0u8; 4096];
  let parts = vec![
    Part::Text("title", "Too big"),
    Part::Text("price", "1"),
    Part::File("video", "lesson.mp4", &video),
    Part::File("thumbnail", "cover.png", b"bytes"),
  ];
  let res = h.post_multipart(&parts, Some(&cookie)).await;
  assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

  assert_eq!(h.upload_count(), 0);
  assert!(h.state.store.list_courses().await.unwrap().is_empty());
}
