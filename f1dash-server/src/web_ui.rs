//! Single-page dashboard, embedded at build time

use axum::http::header;
use axum::response::{Html, IntoResponse};

/// Generated by build.rs from the files in `src/ui/`
const DASHBOARD_PAGE: &str = include_str!("ui.html");

/// Serve the dashboard page. The page is rebuilt with the binary, so
/// browsers revalidate instead of holding a stale copy.
pub async fn dashboard_page() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-cache")], Html(DASHBOARD_PAGE))
}
