//! Session-backed request extractors.
//!
//! [`Viewer`] is for pages anyone may see; it resolves to anonymous on any
//! cookie problem. [`CurrentUser`] rejects anonymous requests with a redirect
//! to the login page before the handler runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use chrono::Utc;
use coursehub_core::{authz::Capability, identity::Identity, store::MarketStore};
use tracing::{debug, warn};

use crate::{
  AppState,
  error::Error,
  session::{SESSION_COOKIE, hash_token, read_cookie},
};

/// The identity behind the request, if any.
pub struct Viewer(pub Option<Identity>);

/// An authenticated identity and the digest of the session it came in on.
pub struct CurrentUser {
  pub identity:   Identity,
  pub token_hash: String,
}

impl CurrentUser {
  /// Fail with 403 unless the identity's role grants `capability`.
  pub fn require(&self, capability: Capability) -> Result<(), Error> {
    if capability.allowed_for(Some(self.identity.role.code())) {
      return Ok(());
    }
    warn!(
      identity_id = self.identity.id,
      role = ?self.identity.role,
      ?capability,
      "capability denied"
    );
    Err(Error::Forbidden)
  }
}

/// Resolve the session cookie in `headers` to a live session's identity.
async fn resolve<S>(
  headers: &HeaderMap,
  state: &AppState<S>,
) -> Result<Option<CurrentUser>, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(cookie) = read_cookie(headers, SESSION_COOKIE) else {
    return Ok(None);
  };
  let Some(token) = state.sessions.verify(&cookie) else {
    debug!("ignoring session cookie with a bad signature");
    return Ok(None);
  };

  let token_hash = hash_token(token);
  let session = state
    .store
    .find_session(&token_hash)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let Some(session) = session.filter(|s| s.is_live_at(Utc::now())) else {
    return Ok(None);
  };

  let identity = state
    .store
    .get_identity(session.identity_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(identity.map(|identity| CurrentUser {
    identity,
    token_hash,
  }))
}

impl<S> FromRequestParts<AppState<S>> for Viewer
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = resolve(&parts.headers, state).await?;
    Ok(Viewer(user.map(|u| u.identity)))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve(&parts.headers, state)
      .await?
      .ok_or(Error::Unauthorized)
  }
}
