//! HTTP surface of the daemon.
//!
//! - `POST /bin`, `GET /bin/:id`: create and read bins
//! - `GET /r/:id`: short-link redirect to the stored content
//! - `/_status/*`: liveness, readiness and version checks
//! - everything else: the prebuilt web client, when a static dir is configured

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::ServiceState;

pub mod api;
pub mod health;
mod redirect;

/// Worst-case growth of a string once JSON-escaped (`\u00XX` per byte)
const JSON_ESCAPE_FACTOR: usize = 6;

/// Room for JSON framing and the other fields on top of `content`
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: ServiceState, static_dir: Option<&Path>) -> Router {
    let body_limit = state
        .bins()
        .max_content_bytes()
        .saturating_mul(JSON_ESCAPE_FACTOR)
        .saturating_add(BODY_OVERHEAD_BYTES);

    let mut router = Router::new()
        .route("/bin", post(api::bin::create::handler))
        .route("/bin/:id", get(api::bin::get::handler))
        .route("/r/:id", get(redirect::handler))
        .nest("/_status", health::router(state.clone()))
        .with_state(state);

    // Unknown paths fall back to index.html so client-side routes like
    // `/<id>?key=...` load the app
    if let Some(dir) = static_dir {
        tracing::info!("serving static assets from {:?}", dir);
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    // The body limit only guards memory; the content size check in
    // `BinService::create` decides what is too large
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}
