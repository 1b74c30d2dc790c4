//! In-memory pagination over catalog listings.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of a listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page:  usize,
  pub pages: usize,
  pub total: usize,
}

/// Slice `items` into the `page`-th window of `per_page` entries.
///
/// Page 0 and pages past the end come back empty rather than failing.
/// A `per_page` of 0 is treated as 1.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
  let per_page = per_page.max(1);
  let total = items.len();
  let pages = total.div_ceil(per_page);

  let items = match page.checked_sub(1) {
    None => Vec::new(),
    Some(index) => items
      .into_iter()
      .skip(index.saturating_mul(per_page))
      .take(per_page)
      .collect(),
  };

  Page {
    items,
    page,
    pages,
    total,
  }
}
