//! Core types and trait definitions for the CourseHub marketplace.
//!
//! Nothing in here touches HTTP or SQL. The storage backend and the web
//! server both build on these types.

// Native `async fn` in traits; the store trait spells out its `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod authz;
pub mod course;
pub mod error;
pub mod identity;
pub mod page;
pub mod session;
pub mod store;

pub use error::{Error, Result};
