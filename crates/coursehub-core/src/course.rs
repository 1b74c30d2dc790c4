//! Courses and their prices.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

// ─── Price ───────────────────────────────────────────────────────────────────

/// A non-negative amount with at most two fractional digits, held as cents.
///
/// Serialized as its decimal text (`"19.99"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
  cents: i64,
}

impl Price {
  pub const ZERO: Price = Price { cents: 0 };

  pub fn from_cents(cents: i64) -> Result<Self> {
    if cents < 0 {
      return Err(Error::InvalidPrice {
        input:  cents.to_string(),
        reason: "price cannot be negative",
      });
    }
    Ok(Self { cents })
  }

  pub fn cents(self) -> i64 { self.cents }
}

impl FromStr for Price {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = |reason| Error::InvalidPrice {
      input: s.to_owned(),
      reason,
    };

    let text = s.trim();
    if text.is_empty() {
      return Err(invalid("price is required"));
    }
    if text.starts_with('-') {
      return Err(invalid("price cannot be negative"));
    }

    let (whole, frac) = match text.split_once('.') {
      Some((whole, frac)) => (whole, Some(frac)),
      None => (text, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid("price must be a number"));
    }

    let frac_cents = match frac {
      None => 0,
      Some(f) if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) => {
        return Err(invalid("price must be a number"));
      }
      Some(f) if f.len() > 2 => {
        return Err(invalid("price has more than two decimal places"));
      }
      Some(f) => {
        let digits = f.bytes().fold(0, |acc, b| acc * 10 + i64::from(b - b'0'));
        // "5" after the point means fifty cents.
        if f.len() == 1 { digits * 10 } else { digits }
      }
    };

    let cents = whole
      .parse::<i64>()
      .ok()
      .and_then(|w| w.checked_mul(100))
      .and_then(|w| w.checked_add(frac_cents))
      .ok_or_else(|| invalid("price is too large"))?;

    Ok(Self { cents })
  }
}

impl fmt::Display for Price {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
  }
}

impl Serialize for Price {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Price {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Course ──────────────────────────────────────────────────────────────────

/// A published course. Never updated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
  pub id:             i64,
  /// Owning identity. Not enforced by the store.
  pub instructor_id:  i64,
  pub title:          String,
  /// Rich text, stored verbatim.
  pub description:    String,
  pub video_path:     String,
  pub thumbnail_path: String,
  pub category:       String,
  pub sub_category:   String,
  pub last_updated:   NaiveDate,
  pub price:          Price,
}

/// Input for [`MarketStore::create_course`](crate::store::MarketStore::create_course).
/// `last_updated` is set by the store.
#[derive(Debug, Clone)]
pub struct NewCourse {
  pub instructor_id:  i64,
  pub title:          String,
  pub description:    String,
  pub video_path:     String,
  pub thumbnail_path: String,
  pub category:       String,
  pub sub_category:   String,
  pub price:          Price,
}
