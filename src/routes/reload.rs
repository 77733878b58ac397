use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::models::{ReloadQuery, ReloadResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/reload_hook", post(reload_hook))
}

/// POST /api/reload_hook?password=... - re-read the data tree.
///
/// The hook is disabled (404) when no secret is configured. A failed reload
/// keeps serving the previous data.
async fn reload_hook(State(state): State<AppState>, Query(query): Query<ReloadQuery>) -> Response {
    let Some(secret) = state.reload_secret.as_deref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if query.password.as_deref() != Some(secret) {
        tracing::warn!("Reload hook called with a wrong password");
        return (StatusCode::FORBIDDEN, "Wrong password").into_response();
    }

    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || store.reload()).await {
        Ok(Ok(root)) => Json(ReloadResponse {
            status: "reloaded",
            cities: root.cities().len(),
            venues: root.venues().len(),
            series: root.all_series().len(),
            events: root.events().len(),
        })
        .into_response(),
        Ok(Err(e)) => {
            tracing::error!("Reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reload failed: {}", e),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Reload task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reload task failed: {}", e),
            )
                .into_response()
        }
    }
}
