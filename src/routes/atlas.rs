//! Atlas endpoint.

#[cfg(test)]
#[path = "atlas_test.rs"]
mod tests;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;

use crate::state::{AppState, Atlas};

/// `GET /api/atlas` — trails, anchors and bookmarks.
pub async fn atlas(State(state): State<AppState>) -> Json<Arc<Atlas>> {
    Json(Arc::clone(&state.atlas))
}
