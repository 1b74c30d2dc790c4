//! Route handlers, one module per area of the site.

pub mod account;
pub mod catalog;
pub mod courses;
pub mod display;
pub mod pages;
