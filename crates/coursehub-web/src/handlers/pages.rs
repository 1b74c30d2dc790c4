//! Static pages. They only need to know who is looking.

use axum::Json;

use crate::{auth::Viewer, views::StaticView};

/// `GET /contact`
pub async fn contact(Viewer(viewer): Viewer) -> Json<StaticView> {
  Json(StaticView {
    view: "contact",
    viewer,
  })
}

/// `GET /about`
pub async fn about(Viewer(viewer): Viewer) -> Json<StaticView> {
  Json(StaticView {
    view: "about",
    viewer,
  })
}
