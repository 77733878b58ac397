pub mod api;
pub mod export;
pub mod health;
pub mod reload;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .merge(api::routes())
        .merge(export::routes())
        .layer(cors)
        .merge(reload::routes())
        .merge(health::routes())
        .with_state(state)
}

/// Current wall-clock time in the meetup timezone.
pub(crate) fn local_now() -> chrono::DateTime<pyvo_core::Tz> {
    chrono::Utc::now().with_timezone(&pyvo_core::TIMEZONE)
}
