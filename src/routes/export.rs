use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;

use pyvo_export::{calendar_entries, feed_entries, to_atom, to_ics, to_rss, FeedInfo, Lang};

use crate::models::LangQuery;
use crate::routes::local_now;
use crate::state::AppState;

/// Number of most recent events in the syndication feeds.
const FEED_LENGTH: usize = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pyvo.ics", get(get_calendar))
        .route("/api/series/{slug}/calendar.ics", get(get_series_calendar))
        .route("/api/pyvo.rss", get(get_rss))
        .route("/api/pyvo.atom", get(get_atom))
}

fn lang(query: &LangQuery) -> Lang {
    query
        .lang
        .as_deref()
        .and_then(Lang::from_code)
        .unwrap_or_default()
}

fn with_content_type(content_type: &'static str, body: String) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /api/pyvo.ics - every recorded event.
async fn get_calendar(State(state): State<AppState>, Query(query): Query<LangQuery>) -> Response {
    let root = state.store.current();
    let entries = calendar_entries(&root, root.events(), &[], lang(&query), local_now());
    with_content_type(
        "text/calendar; charset=utf-8",
        to_ics("Pyvo", &entries, Utc::now()),
    )
}

/// GET /api/series/{slug}/calendar.ics - one series, with tentative dates.
async fn get_series_calendar(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
) -> Response {
    let root = state.store.current();
    let Some(series) = root.series_by_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("Unknown series: {}", slug)).into_response();
    };
    let entries = calendar_entries(
        &root,
        root.events_of(series),
        &[series],
        lang(&query),
        local_now(),
    );
    with_content_type(
        "text/calendar; charset=utf-8",
        to_ics(&series.name, &entries, Utc::now()),
    )
}

fn recent_feed(state: &AppState, self_path: &str) -> (FeedInfo, Vec<pyvo_export::FeedEntry>) {
    let root = state.store.current();
    let events = root.events();
    let recent = &events[events.len().saturating_sub(FEED_LENGTH)..];
    let info = FeedInfo::pyvo(&state.base_url, format!("{}{}", state.base_url, self_path));
    (info, feed_entries(&root, recent.iter(), &state.base_url))
}

/// GET /api/pyvo.rss
async fn get_rss(State(state): State<AppState>) -> Response {
    let (info, entries) = recent_feed(&state, "/api/pyvo.rss");
    with_content_type("application/rss+xml; charset=utf-8", to_rss(&info, &entries))
}

/// GET /api/pyvo.atom
async fn get_atom(State(state): State<AppState>) -> Response {
    let (info, entries) = recent_feed(&state, "/api/pyvo.atom");
    with_content_type("application/atom+xml; charset=utf-8", to_atom(&info, &entries))
}
