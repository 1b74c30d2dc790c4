//! Roles and the capability checks built on them.
//!
//! Roles form a total order: `None < Student < Instructor < Admin`. A role
//! satisfies a requirement when it is at least as high as the required one.
//! Anything that cannot be resolved to a known role is denied.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Authorization level attached to an identity.
///
/// Persisted as its integer code (`0..=3`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  None,
  Student,
  Instructor,
  Admin,
}

impl Role {
  pub const ALL: [Role; 4] =
    [Role::None, Role::Student, Role::Instructor, Role::Admin];

  pub fn code(self) -> i64 {
    match self {
      Role::None => 0,
      Role::Student => 1,
      Role::Instructor => 2,
      Role::Admin => 3,
    }
  }

  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      0 => Some(Role::None),
      1 => Some(Role::Student),
      2 => Some(Role::Instructor),
      3 => Some(Role::Admin),
      _ => None,
    }
  }

  /// Upper-case label shown to users picking an account type.
  pub fn label(self) -> &'static str {
    match self {
      Role::None => "NONE",
      Role::Student => "STUDENT",
      Role::Instructor => "INSTRUCTOR",
      Role::Admin => "ADMIN",
    }
  }

  pub fn permits(self, required: Role) -> bool { self >= required }
}

impl TryFrom<i64> for Role {
  type Error = Error;

  fn try_from(code: i64) -> Result<Self> {
    Role::from_code(code).ok_or(Error::UnknownRole(code))
  }
}

/// Gated actions in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
  CreateCourse,
  ManageCourses,
}

impl Capability {
  pub fn required_role(self) -> Role {
    match self {
      Capability::CreateCourse | Capability::ManageCourses => Role::Instructor,
    }
  }

  /// Whether a holder of role `code` may perform this action.
  pub fn allowed_for(self, code: Option<i64>) -> bool {
    authorize(code, self.required_role())
  }
}

/// Check a raw role code against a requirement.
///
/// Missing or unknown codes never pass, not even against [`Role::None`].
pub fn authorize(code: Option<i64>, required: Role) -> bool {
  code
    .and_then(Role::from_code)
    .is_some_and(|role| role.permits(required))
}
