//! Export-ready views over a sequence of events.
//!
//! Calendar entries and feed entries are two independent projections of the
//! same event list; neither keeps its own copy of the event model.

use chrono::{DateTime, Months, NaiveDate};
use pyvo_core::{next_occurrences, Event, Root, Series, Tz};

/// Domain part of every exported UID.
pub const UID_DOMAIN: &str = "pyvo.cz";

/// Tentative dates are projected at most this far ahead.
pub const TENTATIVE_HORIZON_MONTHS: u32 = 6;

/// At most this many tentative dates per series.
pub const TENTATIVE_PER_SERIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Cs,
    En,
}

impl Lang {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "cs" => Some(Lang::Cs),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    fn tentative_title(self, series_name: &str) -> String {
        match self {
            Lang::Cs => format!("{series_name} – předběžný termín"),
            Lang::En => format!("{series_name} – tentative date"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Confirmed,
    Tentative,
}

impl EntryStatus {
    /// Category tag that lets consumers tell the two apart.
    pub fn category(self) -> &'static str {
        match self {
            EntryStatus::Confirmed => "confirmed",
            EntryStatus::Tentative => "tentative",
        }
    }
}

/// One entry of an exported calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    /// Stable across reloads: derived from series slug and date only.
    pub uid: String,
    pub title: String,
    pub location: Option<String>,
    /// `(latitude, longitude)` of the venue.
    pub geo: Option<(String, String)>,
    pub start: DateTime<Tz>,
    pub description: Option<String>,
    pub status: EntryStatus,
}

/// One entry of an RSS or Atom feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub published: DateTime<Tz>,
    pub updated: DateTime<Tz>,
}

pub fn event_uid(series_slug: &str, date: NaiveDate) -> String {
    format!("{series_slug}-{date}@{UID_DOMAIN}")
}

pub fn tentative_uid(series_slug: &str, date: NaiveDate) -> String {
    format!("{series_slug}-{date}-tentative@{UID_DOMAIN}")
}

/// Venue name, short address and city, as one line.
pub fn event_location(root: &Root, event: &Event) -> String {
    let city = root.city_of(event);
    match root.venue_of(event) {
        Some(venue) => {
            let mut parts = vec![venue.name.as_str()];
            parts.extend(venue.short_address());
            parts.push(city.name.as_str());
            parts.join(", ")
        }
        None => city.name.clone(),
    }
}

/// Public URL of an event page below `base_url`.
pub fn event_url(base_url: &str, root: &Root, event: &Event) -> String {
    format!(
        "{}/{}/{}/",
        base_url.trim_end_matches('/'),
        root.series_of(event).slug,
        event.slug()
    )
}

/// Calendar entries for `events`, followed by tentative dates for each
/// series in `projected`.
///
/// Tentative dates start after `now` and stop at the horizon.
pub fn calendar_entries<'a>(
    root: &'a Root,
    events: impl IntoIterator<Item = &'a Event>,
    projected: &[&Series],
    lang: Lang,
    now: DateTime<Tz>,
) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = events
        .into_iter()
        .map(|event| CalendarEntry {
            uid: event_uid(&root.series_of(event).slug, event.date()),
            title: event.title(),
            location: Some(event_location(root, event)),
            geo: root
                .venue_of(event)
                .map(|v| (v.latitude().to_string(), v.longitude().to_string())),
            start: event.start,
            description: event.description.clone(),
            status: EntryStatus::Confirmed,
        })
        .collect();

    let Some(horizon) = now.checked_add_months(Months::new(TENTATIVE_HORIZON_MONTHS)) else {
        return entries;
    };
    for series in projected {
        let description = series.recurrence.as_ref().and_then(|r| match lang {
            Lang::Cs => r.description_cs.clone(),
            Lang::En => r.description_en.clone(),
        });
        let location = root.city(series.home_city).name.clone();
        let occurrences = next_occurrences(
            root,
            series,
            Some(TENTATIVE_PER_SERIES),
            Some(now.date_naive()),
        );
        for start in occurrences.until(horizon) {
            entries.push(CalendarEntry {
                uid: tentative_uid(&series.slug, start.date_naive()),
                title: lang.tentative_title(&series.name),
                location: Some(location.clone()),
                geo: None,
                start,
                description: description.clone(),
                status: EntryStatus::Tentative,
            });
        }
    }
    entries
}

/// Feed entries for `events` (given oldest first), newest first.
pub fn feed_entries<'a>(
    root: &'a Root,
    events: impl DoubleEndedIterator<Item = &'a Event>,
    base_url: &str,
) -> Vec<FeedEntry> {
    events
        .rev()
        .map(|event| {
            let url = event_url(base_url, root, event);
            FeedEntry {
                id: url.clone(),
                url,
                title: event.title(),
                summary: event.description.clone(),
                published: event.start,
                updated: event.start,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pyvo_core::fixtures::write_sample;
    use pyvo_core::{load_root, TIMEZONE};
    use tempfile::tempdir;

    fn sample() -> Root {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        load_root(dir.path()).unwrap()
    }

    fn now() -> DateTime<Tz> {
        TIMEZONE.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_confirmed_entries() {
        let root = sample();
        let entries = calendar_entries(&root, root.events(), &[], Lang::Cs, now());

        assert_eq!(entries.len(), 3);
        let web = &entries[2];
        assert_eq!(web.uid, "brno-pyvo-2024-06-27@pyvo.cz");
        assert_eq!(web.title, "Brněnské Pyvo #100 Web");
        assert_eq!(
            web.location.as_deref(),
            Some("U Dřevěného orla, Minská 17, Brno")
        );
        assert_eq!(
            web.geo,
            Some(("49.2108".to_string(), "16.5949".to_string()))
        );
        assert_eq!(web.description.as_deref(), Some("Sté Pyvo"));
        assert_eq!(web.status, EntryStatus::Confirmed);
        assert_eq!(
            entries[1].location.as_deref(),
            Some("Na Věnečku, Lidická 8, Praha 5, Praha")
        );
    }

    #[test]
    fn test_uids_stable_across_reloads() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let first = load_root(dir.path()).unwrap();
        let second = load_root(dir.path()).unwrap();

        let uids = |root: &Root| -> Vec<String> {
            calendar_entries(root, root.events(), &[], Lang::En, now())
                .into_iter()
                .map(|e| e.uid)
                .collect()
        };
        assert_eq!(uids(&first), uids(&second));
    }

    #[test]
    fn test_tentative_entries() {
        let root = sample();
        let brno = root.series_by_slug("brno-pyvo").unwrap();
        let praha = root.series_by_slug("praha-pyvo").unwrap();
        let entries = calendar_entries(&root, root.events_of(brno), &[brno, praha], Lang::En, now());

        let tentative: Vec<_> = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Tentative)
            .collect();
        // 4th Thursdays from July to December 2024; praha has no rule.
        assert_eq!(tentative.len(), 6);
        assert_eq!(tentative[0].uid, "brno-pyvo-2024-07-25-tentative@pyvo.cz");
        assert_eq!(tentative[0].title, "Brněnské Pyvo – tentative date");
        assert_eq!(
            tentative[0].description.as_deref(),
            Some("Every fourth Thursday of the month")
        );
        assert_eq!(tentative[0].status.category(), "tentative");
        assert!(tentative.iter().all(|e| e.start < now() + Months::new(6)));
    }

    #[test]
    fn test_tentative_horizon() {
        let root = sample();
        let brno = root.series_by_slug("brno-pyvo").unwrap();
        let entries = calendar_entries(&root, std::iter::empty(), &[brno], Lang::Cs, now());

        assert!(entries.len() <= TENTATIVE_PER_SERIES);
        assert_eq!(entries[0].title, "Brněnské Pyvo – předběžný termín");
        let horizon = now().checked_add_months(Months::new(6)).unwrap();
        assert!(entries.iter().all(|e| e.start <= horizon));
    }

    #[test]
    fn test_feed_entries_newest_first() {
        let root = sample();
        let entries = feed_entries(&root, root.events().iter(), "https://pyvo.cz/");

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].url, "https://pyvo.cz/brno-pyvo/2024-06/");
        assert_eq!(entries[0].id, entries[0].url);
        assert_eq!(entries[2].url, "https://pyvo.cz/brno-pyvo/2024-05/");
        assert!(entries.windows(2).all(|w| w[0].published >= w[1].published));
    }

    #[test]
    fn test_lang_codes() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("de"), None);
        assert_eq!(Lang::default(), Lang::Cs);
    }
}
