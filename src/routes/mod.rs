//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the atlas API, the boundary datasets under `/data`,
//! and the static site for every other path.

pub mod atlas;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let site = ServeDir::new(&state.site_dir).append_index_html_on_directories(true);
    let data = ServeDir::new(&state.data_dir);

    Router::new()
        .route("/api/atlas", get(atlas::atlas))
        .route("/healthz", get(healthz))
        .nest_service("/data", data)
        .fallback_service(site)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
