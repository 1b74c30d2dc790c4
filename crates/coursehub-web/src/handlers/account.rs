//! Handlers for registration, login and logout.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/login` | Login form |
//! | `POST` | `/login` | Form `email`, `password`; 303 to `/` or back to `/login` |
//! | `GET`/`POST` | `/logout` | Session required |
//! | `GET`  | `/register` | Register form with the account types |
//! | `POST` | `/register` | Form `full_name`, `email`, `password`, `checkbox_auth` |

use axum::{
  Form, Json,
  extract::State,
  http::header,
  response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use coursehub_core::{
  authz::Role,
  identity::NewIdentity,
  session::NewSession,
  store::{InsertOutcome, MarketStore},
};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  password,
  session::hash_token,
  views::FormView,
};

pub const DUPLICATE_EMAIL: &str =
  "This email already exists. Please choose a different one.";
pub const REGISTRATION_FAILED: &str = "There was an issue with registration.";

// ─── Login ────────────────────────────────────────────────────────────────────

/// `GET /login`
pub async fn login_page() -> Json<FormView> { Json(FormView::login("")) }

#[derive(Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

/// Every failed attempt gets this same answer, whatever the cause.
fn login_failed() -> Response { Redirect::to("/login").into_response() }

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let identity = state
    .store
    .find_identity_by_email(&form.email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let Some(identity) = identity else {
    info!(email = %form.email, "login failed: no such email");
    return Ok(login_failed());
  };
  if !password::verify_password(&form.password, &identity.password_hash) {
    info!(identity_id = identity.id, "login failed: wrong password");
    return Ok(login_failed());
  }

  let issued = state.sessions.issue();
  state
    .store
    .create_session(NewSession {
      token_hash:  hash_token(&issued.token),
      identity_id: identity.id,
      expires_at:  Utc::now() + state.sessions.ttl(),
    })
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  info!(identity_id = identity.id, "login succeeded");
  Ok(
    (
      [(header::SET_COOKIE, state.sessions.set_cookie(&issued.cookie_value))],
      Redirect::to("/"),
    )
      .into_response(),
  )
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `GET|POST /logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Response, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .delete_session(&user.token_hash)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  info!(identity_id = user.identity.id, "logged out");
  Ok(
    (
      [(header::SET_COOKIE, state.sessions.clear_cookie())],
      Redirect::to("/login"),
    )
      .into_response(),
  )
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `GET /register`
pub async fn register_page() -> Json<FormView> { Json(FormView::register("")) }

#[derive(Deserialize)]
pub struct RegisterForm {
  #[serde(default)]
  pub full_name:     String,
  #[serde(default)]
  pub email:         String,
  #[serde(default)]
  pub password:      String,
  /// Role code picked from the account-type options.
  #[serde(default)]
  pub checkbox_auth: String,
}

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<RegisterForm>,
) -> Result<Response, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let invalid = |message: &str| Error::Validation(FormView::register(message));

  if form.full_name.trim().is_empty() {
    return Err(invalid("Please enter your full name."));
  }
  if form.email.trim().is_empty() {
    return Err(invalid("Please enter an email address."));
  }
  if !form.email.contains('@') {
    return Err(invalid("Please enter a valid email address."));
  }
  if form.password.is_empty() {
    return Err(invalid("Please choose a password."));
  }
  let role = form
    .checkbox_auth
    .trim()
    .parse::<i64>()
    .map_err(|_| invalid("Please choose a valid account type."))
    .and_then(|code| {
      Role::try_from(code).map_err(|e| {
        debug!(error = %e, "registration rejected");
        invalid("Please choose a valid account type.")
      })
    })?;

  let password_hash = password::hash_password(&form.password)?;

  let outcome = state
    .store
    .create_identity(NewIdentity {
      full_name: form.full_name,
      email: form.email.clone(),
      password_hash,
      role,
    })
    .await;

  match outcome {
    Ok(InsertOutcome::Inserted(identity)) => {
      info!(identity_id = identity.id, role = ?identity.role, "registered identity");
      Ok(Redirect::to("/login").into_response())
    }
    Ok(InsertOutcome::Conflict) => {
      info!(email = %form.email, "registration rejected: email already registered");
      Err(Error::Conflict(FormView::register(DUPLICATE_EMAIL)))
    }
    Err(e) => {
      error!(error = %e, "registration failed");
      Err(Error::Failed(FormView::register(REGISTRATION_FAILED)))
    }
  }
}
