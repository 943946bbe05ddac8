//! Static front-end serving.
//!
//! Files come from the configured public directory. A directory request
//! serves its `index.html`; contents are never listed.

use std::path::Path;

use axum::{
  Router,
  extract::Request,
  http::{
    HeaderValue,
    header::{
      CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY,
      X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
    },
  },
  middleware::{self, Next},
  response::Response,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

const CONTENT_SECURITY: &str = "default-src 'self'; img-src 'self' data: https:; \
  style-src 'self' 'unsafe-inline' https:; script-src 'self' 'unsafe-inline' https:; \
  connect-src 'self' https:";

const NO_CACHE: &str = "no-cache";
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Router that serves `public_dir` as its fallback with security and caching
/// headers on every response.
pub fn static_router(public_dir: &Path) -> Router {
  let files = ServeDir::new(public_dir).append_index_html_on_directories(true);

  Router::new()
    .fallback_service(files)
    .layer(middleware::from_fn(cache_control))
    .layer(SetResponseHeaderLayer::overriding(
      X_CONTENT_TYPE_OPTIONS,
      HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      X_FRAME_OPTIONS,
      HeaderValue::from_static("SAMEORIGIN"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      X_XSS_PROTECTION,
      HeaderValue::from_static("0"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      REFERRER_POLICY,
      HeaderValue::from_static("strict-origin-when-cross-origin"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      CONTENT_SECURITY_POLICY,
      HeaderValue::from_static(CONTENT_SECURITY),
    ))
}

/// HTML entry points (including directory requests, which resolve to
/// `index.html`) must be revalidated; everything else is cached for a year.
async fn cache_control(req: Request, next: Next) -> Response {
  let value = cache_policy(req.uri().path());
  let mut resp = next.run(req).await;
  resp
    .headers_mut()
    .insert(CACHE_CONTROL, HeaderValue::from_static(value));
  resp
}

fn cache_policy(path: &str) -> &'static str {
  if path.ends_with('/') || path.ends_with(".html") { NO_CACHE } else { IMMUTABLE }
}
