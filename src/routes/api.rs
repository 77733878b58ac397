use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use chrono::NaiveDate;

use pyvo_core::{default_window, get_calendar, next_occurrences};
use pyvo_export::{event_add_link, venue_geojson};

use crate::models::{
    CalendarQuery, CityResponse, MonthResponse, NextQuery, NextResponse, SeriesDetail,
    SeriesSummary, VideoResponse, VideosQuery,
};
use crate::routes::local_now;
use crate::state::AppState;

const MAX_MONTHS: u32 = 24;
const MAX_COUNT: usize = 50;
const MAX_VIDEOS: usize = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cities", get(get_cities))
        .route("/api/series", get(get_series_list))
        .route("/api/series/{slug}", get(get_series))
        .route("/api/series/{slug}/next", get(get_next))
        .route("/api/calendar", get(get_calendar_months))
        .route("/api/videos", get(get_videos))
        .route("/api/venues/{slug}/geo", get(get_venue_geo))
}

fn not_found(what: &str, slug: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("Unknown {}: {}", what, slug)).into_response()
}

/// GET /api/cities
async fn get_cities(State(state): State<AppState>) -> Json<Vec<CityResponse>> {
    let root = state.store.current();
    Json(root.cities().iter().map(Into::into).collect())
}

/// GET /api/series - every series with its latest event.
async fn get_series_list(State(state): State<AppState>) -> Json<Vec<SeriesSummary>> {
    let root = state.store.current();
    Json(
        root.all_series()
            .iter()
            .map(|series| SeriesSummary::new(&root, series, &state.base_url))
            .collect(),
    )
}

/// GET /api/series/{slug}
async fn get_series(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let root = state.store.current();
    let Some(series) = root.series_by_slug(&slug) else {
        return not_found("series", &slug);
    };
    let add_link = event_add_link(&root, series);
    Json(SeriesDetail::new(&root, series, &state.base_url, add_link)).into_response()
}

/// GET /api/series/{slug}/next?count=N - projected dates after today.
async fn get_next(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<NextQuery>,
) -> Response {
    let root = state.store.current();
    let Some(series) = root.series_by_slug(&slug) else {
        return not_found("series", &slug);
    };
    let today = local_now().date_naive();
    let occurrences = next_occurrences(&root, series, Some(query.count.min(MAX_COUNT)), Some(today))
        .iter()
        .map(|dt| dt.to_rfc3339())
        .collect();
    Json(NextResponse {
        series: series.slug.clone(),
        occurrences,
    })
    .into_response()
}

/// GET /api/calendar?year=&month=&months=&series=a,b
///
/// Without `year` and `month` the window is centered on the current month.
async fn get_calendar_months(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Response {
    let months = query.months.clamp(1, MAX_MONTHS);
    let (year, month) = match (query.year, query.month) {
        (Some(year), Some(month))
            if NaiveDate::from_ymd_opt(year, month.try_into().unwrap_or(0), 1).is_some() =>
        {
            (year, month)
        }
        (None, None) => {
            let (year, month) = default_window(local_now().date_naive(), months);
            (year, month as i32)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "year and month (1-12) must be given together and form a valid date",
            )
                .into_response();
        }
    };

    let filter: Option<Vec<&str>> = query.series.as_deref().map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .collect()
    });

    let root = state.store.current();
    let grids = get_calendar(
        &root,
        year,
        month,
        months,
        filter.as_deref(),
        state.holidays.as_ref(),
    );
    let response: Vec<MonthResponse> = grids
        .values()
        .map(|grid| MonthResponse::new(&root, grid))
        .collect();
    Json(response).into_response()
}

/// GET /api/videos?limit=N - most recent talk recordings.
async fn get_videos(
    State(state): State<AppState>,
    Query(query): Query<VideosQuery>,
) -> Json<Vec<VideoResponse>> {
    let root = state.store.current();
    Json(
        root.videos(query.limit.min(MAX_VIDEOS))
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

/// GET /api/venues/{slug}/geo - GeoJSON for map embeds.
async fn get_venue_geo(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let root = state.store.current();
    match root.venue_by_slug(&slug) {
        Some(venue) => Json(venue_geojson(venue)).into_response(),
        None => not_found("venue", &slug),
    }
}
