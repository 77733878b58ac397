//! JSON shapes returned by the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pyvo_core::{City, Day, Event, MonthGrid, Organizer, Root, Series, Talk, Video};
use pyvo_export::event_url;

#[derive(Debug, Serialize)]
pub struct CityResponse {
    pub slug: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub venues: Vec<String>,
}

impl From<&City> for CityResponse {
    fn from(city: &City) -> Self {
        Self {
            slug: city.slug.clone(),
            name: city.name.clone(),
            latitude: city.location.latitude.clone(),
            longitude: city.location.longitude.clone(),
            venues: city.venues.keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TalkLinkResponse {
    pub kind: Option<String>,
    pub url: String,
    pub youtube_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TalkResponse {
    pub title: String,
    pub description: Option<String>,
    pub speakers: Vec<String>,
    pub lightning: bool,
    pub links: Vec<TalkLinkResponse>,
}

impl From<&Talk> for TalkResponse {
    fn from(talk: &Talk) -> Self {
        Self {
            title: talk.title.clone(),
            description: talk.description.clone(),
            speakers: talk.speakers.iter().map(|s| s.name.clone()).collect(),
            lightning: talk.is_lightning,
            links: talk
                .links
                .iter()
                .map(|link| TalkLinkResponse {
                    kind: link.kind.clone(),
                    url: link.url.clone(),
                    youtube_id: link.youtube_id().map(str::to_string),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub series: String,
    pub slug: String,
    pub title: String,
    pub name: String,
    pub number: Option<i64>,
    pub topic: Option<String>,
    pub date: NaiveDate,
    pub start: String,
    pub city: String,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub links: Vec<String>,
    pub talks: Vec<TalkResponse>,
}

impl EventResponse {
    pub fn new(root: &Root, event: &Event, base_url: &str) -> Self {
        Self {
            series: root.series_of(event).slug.clone(),
            slug: event.slug(),
            title: event.title(),
            name: event.name.clone(),
            number: event.number,
            topic: event.topic.clone(),
            date: event.date(),
            start: event.start.to_rfc3339(),
            city: root.city_of(event).slug.clone(),
            venue: root.venue_of(event).map(|v| v.slug.clone()),
            description: event.description.clone(),
            url: event_url(base_url, root, event),
            links: event.links.iter().map(|l| l.url.clone()).collect(),
            talks: root.talks_of(event).map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizerResponse {
    pub name: String,
    pub phone: Option<String>,
    pub mail: Option<String>,
    pub web: Option<String>,
}

impl From<&Organizer> for OrganizerResponse {
    fn from(o: &Organizer) -> Self {
        Self {
            name: o.name.clone(),
            phone: o.phone.clone(),
            mail: o.mail.clone(),
            web: o.web.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecurrenceResponse {
    pub rule: String,
    pub scheme: String,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesSummary {
    pub slug: String,
    pub name: String,
    pub home_city: String,
    pub event_count: usize,
    pub last_event: Option<EventResponse>,
}

impl SeriesSummary {
    pub fn new(root: &Root, series: &Series, base_url: &str) -> Self {
        Self {
            slug: series.slug.clone(),
            name: series.name.clone(),
            home_city: root.city(series.home_city).slug.clone(),
            event_count: series.events.len(),
            last_event: root
                .last_event(series)
                .map(|e| EventResponse::new(root, e, base_url)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesDetail {
    pub slug: String,
    pub name: String,
    pub home_city: String,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
    pub organizers: Vec<OrganizerResponse>,
    pub recurrence: Option<RecurrenceResponse>,
    /// Most recent first.
    pub events: Vec<EventResponse>,
    pub add_event_url: String,
}

impl SeriesDetail {
    pub fn new(root: &Root, series: &Series, base_url: &str, add_event_url: String) -> Self {
        Self {
            slug: series.slug.clone(),
            name: series.name.clone(),
            home_city: root.city(series.home_city).slug.clone(),
            description_cs: series.description_cs.clone(),
            description_en: series.description_en.clone(),
            organizers: series.organizers.iter().map(Into::into).collect(),
            recurrence: series.recurrence.as_ref().map(|r| RecurrenceResponse {
                rule: r.rule.clone(),
                scheme: r.scheme.clone(),
                description_cs: r.description_cs.clone(),
                description_en: r.description_en.clone(),
            }),
            events: root
                .events_of(series)
                .rev()
                .map(|e| EventResponse::new(root, e, base_url))
                .collect(),
            add_event_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    pub series: String,
    pub occurrences: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DayEventResponse {
    pub series: String,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub events: Vec<DayEventResponse>,
    pub holiday: Option<&'static str>,
    pub weekend: bool,
    pub projected: Vec<String>,
    pub alien: bool,
}

impl DayResponse {
    fn new(root: &Root, day: &Day<'_>) -> Self {
        Self {
            date: day.date,
            events: day
                .events
                .iter()
                .map(|e| DayEventResponse {
                    series: root.series_of(e).slug.clone(),
                    slug: e.slug(),
                    title: e.title(),
                })
                .collect(),
            holiday: day.holiday.map(|h| h.name),
            weekend: day.weekend,
            projected: day.projected.iter().map(|s| s.slug.clone()).collect(),
            alien: day.alien,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayResponse>>,
}

impl MonthResponse {
    pub fn new(root: &Root, grid: &MonthGrid<'_>) -> Self {
        Self {
            year: grid.year,
            month: grid.month,
            weeks: grid
                .weeks
                .iter()
                .map(|week| week.iter().map(|day| DayResponse::new(root, day)).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub youtube_id: String,
    pub url: String,
    pub talk: String,
    pub speakers: Vec<String>,
    pub event: String,
    pub date: NaiveDate,
}

impl From<Video<'_>> for VideoResponse {
    fn from(video: Video<'_>) -> Self {
        Self {
            youtube_id: video.link.youtube_id().unwrap_or_default().to_string(),
            url: video.link.url.clone(),
            talk: video.talk.title.clone(),
            speakers: video.talk.speakers.iter().map(|s| s.name.clone()).collect(),
            event: video.event.title(),
            date: video.event.date(),
        }
    }
}

/// Query parameters for the calendar endpoint.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<i32>,
    #[serde(default = "default_months")]
    pub months: u32,
    /// Comma-separated series slugs.
    pub series: Option<String>,
}

fn default_months() -> u32 {
    3
}

/// Query parameters for the projection endpoint.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct VideosQuery {
    #[serde(default = "default_video_limit")]
    pub limit: usize,
}

fn default_video_limit() -> usize {
    12
}

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReloadQuery {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub cities: usize,
    pub venues: usize,
    pub series: usize,
    pub events: usize,
}
