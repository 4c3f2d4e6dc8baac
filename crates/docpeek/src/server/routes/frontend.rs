//! Front-end page

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::server::state::AppState;

/// GET / - Serve the configured HTML page
pub async fn index(State(state): State<AppState>) -> Response {
    let path = state.config().frontend.index_path();

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Front-end page {} unavailable: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "Front-end page not found").into_response()
        }
    }
}
