//! Signed session cookies and the expired-session reaper.
//!
//! The cookie carries `<token>.<signature>`, where the signature is a hex
//! HMAC-SHA256 of the token under the configured secret. The store only
//! ever sees the SHA-256 digest of the token.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use coursehub_core::store::MarketStore;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "coursehub_session";

/// A freshly minted token and the signed cookie value that carries it.
pub struct IssuedToken {
  pub token:        String,
  pub cookie_value: String,
}

/// Signing key and cookie attributes for session cookies.
#[derive(Clone)]
pub struct SessionKeys {
  mac:    HmacSha256,
  ttl:    Duration,
  secure: bool,
}

impl SessionKeys {
  pub fn new(secret: &str, ttl: Duration, secure: bool) -> Result<Self, Error> {
    if secret.is_empty() {
      return Err(Error::Config("session_secret must not be empty".into()));
    }
    let mac = HmacSha256::new_from_slice(secret.as_bytes())
      .map_err(|e| Error::Config(format!("session_secret: {e}")))?;
    Ok(Self { mac, ttl, secure })
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// Generate 32 random bytes of token and sign them.
  pub fn issue(&self) -> IssuedToken {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let cookie_value = format!("{token}.{}", self.sign(&token));
    IssuedToken {
      token,
      cookie_value,
    }
  }

  fn sign(&self, token: &str) -> String {
    let mut mac = self.mac.clone();
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
  }

  /// Return the token inside `cookie_value` if its signature checks out.
  /// The comparison is constant-time.
  pub fn verify<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
    let (token, signature) = cookie_value.rsplit_once('.')?;
    let signature = hex::decode(signature).ok()?;
    let mut mac = self.mac.clone();
    mac.update(token.as_bytes());
    mac.verify_slice(&signature).ok()?;
    Some(token)
  }

  /// `Set-Cookie` value installing a session.
  pub fn set_cookie(&self, cookie_value: &str) -> String {
    format!(
      "{SESSION_COOKIE}={cookie_value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
      self.ttl.num_seconds(),
      self.secure_attr(),
    )
  }

  /// `Set-Cookie` value removing the session cookie.
  pub fn clear_cookie(&self) -> String {
    format!(
      "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
      self.secure_attr(),
    )
  }

  fn secure_attr(&self) -> &'static str { if self.secure { "; Secure" } else { "" } }
}

/// Digest under which a token is stored.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Value of cookie `name`, searching every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|s| s.split(';'))
    .find_map(|pair| {
      let (key, value) = pair.trim().split_once('=')?;
      (key == name).then(|| value.to_owned())
    })
}

// ─── Reaper ──────────────────────────────────────────────────────────────────

/// Purge expired sessions every `every` for the life of the process.
pub fn spawn_reaper<S>(store: Arc<S>, every: std::time::Duration) -> JoinHandle<()>
where
  S: MarketStore + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      match store.purge_expired_sessions(Utc::now()).await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "removed expired sessions"),
        Err(e) => error!(error = %e, "failed to purge expired sessions"),
      }
    }
  })
}
