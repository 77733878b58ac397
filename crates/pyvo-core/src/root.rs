use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_yaml::Mapping;

use crate::build::Record;
use crate::city::{City, CityDraft, Venue};
use crate::error::LoadError;
use crate::event::{Event, Talk, TalkLink};
use crate::ids::{CityId, EventId, SeriesId, TalkId, VenueId};
use crate::series::{Series, SeriesDraft};
use crate::validation::validate;

/// The whole data set, fully built and validated.
///
/// Entities live in arenas and refer to each other through typed ids. An id
/// is only meaningful for the `Root` that issued it.
#[derive(Debug, Clone)]
pub struct Root {
    pub(crate) cities: Vec<City>,
    pub(crate) venues: Vec<Venue>,
    pub(crate) series: Vec<Series>,
    /// Sorted by start, ascending.
    pub(crate) events: Vec<Event>,
    pub(crate) talks: Vec<Talk>,
    pub(crate) city_index: BTreeMap<String, CityId>,
    pub(crate) venue_index: BTreeMap<String, VenueId>,
    pub(crate) series_index: BTreeMap<String, SeriesId>,
}

/// A talk recording, with the talk and event it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Video<'a> {
    pub link: &'a TalkLink,
    pub talk: &'a Talk,
    pub event: &'a Event,
}

impl Root {
    /// Build the object graph from a loaded tree and validate it.
    ///
    /// Cities and their venues come first, then series with their events,
    /// talks and links. Back-references are attached as each owner is
    /// finished; nothing is reachable before that.
    pub fn from_tree(tree: &Mapping) -> Result<Self, LoadError> {
        let top = Record::from_mapping(tree, "<root>");

        let mut cities = Vec::new();
        let mut venues = Vec::new();
        let mut city_index = BTreeMap::new();
        let mut venue_index = BTreeMap::new();
        for (slug, value) in top.entries("cities")? {
            let draft = CityDraft::build(slug, &Record::new(value, format!("cities/{slug}"))?)?;
            let city_id = CityId(cities.len());
            let mut own_venues = BTreeMap::new();
            for venue in draft.venues {
                if venue_index.contains_key(&venue.slug) {
                    return Err(LoadError::DuplicateVenue(venue.slug));
                }
                let venue_id = VenueId(venues.len());
                venue_index.insert(venue.slug.clone(), venue_id);
                own_venues.insert(venue.slug.clone(), venue_id);
                venues.push(venue.finish(city_id));
            }
            cities.push(City {
                name: draft.name,
                slug: draft.slug,
                location: draft.location,
                venues: own_venues,
            });
            city_index.insert(slug.to_string(), city_id);
        }

        let mut heads = Vec::new();
        let mut pending = Vec::new();
        let mut series_index = BTreeMap::new();
        for (slug, value) in top.entries("series")? {
            let dir = Record::new(value, format!("series/{slug}"))?;
            let mut draft = SeriesDraft::build(slug, &dir, &city_index, &venue_index)?;
            let series_id = SeriesId(heads.len());
            pending.extend(
                std::mem::take(&mut draft.events)
                    .into_iter()
                    .map(|event| (series_id, event)),
            );
            series_index.insert(slug.to_string(), series_id);
            heads.push(draft);
        }

        // Stable: simultaneous events keep series order, then file order.
        pending.sort_by(|a, b| a.1.start.cmp(&b.1.start));

        let mut events = Vec::with_capacity(pending.len());
        let mut talks = Vec::new();
        let mut series_events = vec![Vec::new(); heads.len()];
        for (index, (series_id, mut draft)) in pending.into_iter().enumerate() {
            let event_id = EventId(index);
            let talk_ids = std::mem::take(&mut draft.talks)
                .into_iter()
                .map(|talk| {
                    let talk_id = TalkId(talks.len());
                    talks.push(talk.finish(talk_id, event_id));
                    talk_id
                })
                .collect();
            series_events[series_id.0].push(event_id);
            events.push(draft.finish(series_id, talk_ids));
        }

        let series = heads
            .into_iter()
            .zip(series_events)
            .map(|(head, events)| Series {
                name: head.name,
                slug: head.slug,
                home_city: head.home_city,
                description_cs: head.description_cs,
                description_en: head.description_en,
                events,
                organizers: head.organizers,
                recurrence: head.recurrence,
                source: head.source,
            })
            .collect();

        let root = Self {
            cities,
            venues,
            series,
            events,
            talks,
            city_index,
            venue_index,
            series_index,
        };
        validate(&root)?;

        tracing::info!(
            "Loaded {} cities, {} venues, {} series, {} events",
            root.cities.len(),
            root.venues.len(),
            root.series.len(),
            root.events.len()
        );
        Ok(root)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id.0]
    }

    pub fn city_by_slug(&self, slug: &str) -> Option<&City> {
        self.city_index.get(slug).map(|id| self.city(*id))
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn venue(&self, id: VenueId) -> &Venue {
        &self.venues[id.0]
    }

    pub fn venue_by_slug(&self, slug: &str) -> Option<&Venue> {
        self.venue_index.get(slug).map(|id| self.venue(*id))
    }

    /// All series, ordered by slug.
    pub fn all_series(&self) -> &[Series] {
        &self.series
    }

    pub fn series(&self, id: SeriesId) -> &Series {
        &self.series[id.0]
    }

    pub fn series_by_slug(&self, slug: &str) -> Option<&Series> {
        self.series_index.get(slug).map(|id| self.series(*id))
    }

    /// All events across all series, ascending by start.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id.0]
    }

    pub fn talk(&self, id: TalkId) -> &Talk {
        &self.talks[id.0]
    }

    pub fn series_of(&self, event: &Event) -> &Series {
        self.series(event.series)
    }

    pub fn city_of(&self, event: &Event) -> &City {
        self.city(event.city)
    }

    pub fn venue_of(&self, event: &Event) -> Option<&Venue> {
        event.venue.map(|id| self.venue(id))
    }

    pub fn talks_of<'a>(&'a self, event: &'a Event) -> impl Iterator<Item = &'a Talk> + 'a {
        event.talks.iter().map(|id| self.talk(*id))
    }

    /// Events of a series, ascending by start. Reverse for most recent first.
    pub fn events_of<'a>(
        &'a self,
        series: &'a Series,
    ) -> impl DoubleEndedIterator<Item = &'a Event> + ExactSizeIterator + 'a {
        series.events.iter().map(|id| self.event(*id))
    }

    pub fn last_event(&self, series: &Series) -> Option<&Event> {
        series.events.last().map(|id| self.event(*id))
    }

    /// Look up an event by series slug and event slug (`YYYY-MM`).
    pub fn event_in_series(&self, series_slug: &str, event_slug: &str) -> Option<&Event> {
        let series = self.series_by_slug(series_slug)?;
        self.events_of(series).find(|e| e.slug() == event_slug)
    }

    /// Events held in a city, ascending by start. Empty for unknown slugs.
    pub fn events_in_city(&self, city_slug: &str) -> Vec<&Event> {
        match self.city_index.get(city_slug) {
            Some(id) => self.events.iter().filter(|e| e.city == *id).collect(),
            None => Vec::new(),
        }
    }

    /// The most recent event of every series: upcoming ones first, then the
    /// rest, each group ordered by distance from `today`.
    pub fn latest_events(&self, today: NaiveDate) -> Vec<&Event> {
        let mut latest: Vec<&Event> = self
            .series
            .iter()
            .filter_map(|s| self.last_event(s))
            .collect();
        latest.sort_by_key(|e| {
            let date = e.date();
            (date < today, (date - today).num_days().abs())
        });
        latest
    }

    /// Up to `limit` YouTube recordings, newest event first, talks in order.
    pub fn videos(&self, limit: usize) -> Vec<Video<'_>> {
        self.events
            .iter()
            .rev()
            .flat_map(|event| {
                self.talks_of(event).flat_map(move |talk| {
                    talk.links
                        .iter()
                        .filter(|link| link.youtube_id().is_some())
                        .map(move |link| Video { link, talk, event })
                })
            })
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{write_sample, write_tree, SAMPLE};
    use crate::load_root;
    use chrono::Timelike;
    use tempfile::tempdir;

    fn sample() -> Root {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        load_root(dir.path()).unwrap()
    }

    #[test]
    fn test_round_trip_event_fields() {
        let root = sample();
        let event = root.event_in_series("brno-pyvo", "2024-06").unwrap();

        assert_eq!(event.name, "Brněnské Pyvo");
        assert_eq!(event.slug(), "2024-06");
        assert_eq!(event.title(), "Brněnské Pyvo #100 Web");
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 6, 27).unwrap());
        assert_eq!((event.start.hour(), event.start.minute()), (19, 30));
        assert_eq!(event.description.as_deref(), Some("Sté Pyvo"));
        assert_eq!(event.links[0].url, "https://www.meetup.com/pyvo/events/100");
        assert_eq!(
            event.source.to_str(),
            Some("series/brno-pyvo/events/2024-06-27-web.yaml")
        );
        assert_eq!(root.venue_of(event).unwrap().slug, "u-dreveneho-orla");
        assert_eq!(root.city_of(event).name, "Brno");
        assert_eq!(root.series_of(event).slug, "brno-pyvo");
    }

    #[test]
    fn test_bare_date_event() {
        let root = sample();
        let event = root.event_in_series("praha-pyvo", "2024-06").unwrap();

        assert_eq!(event.title(), "Pražské Pyvo – Docker");
        assert_eq!(event.start.hour(), 19);
        assert!(event.talks.is_empty());
    }

    #[test]
    fn test_back_references() {
        let root = sample();
        for (index, event) in root.events().iter().enumerate() {
            assert!(root.series_of(event).events.contains(&EventId(index)));
            for talk_id in &event.talks {
                let talk = root.talk(*talk_id);
                assert_eq!(talk.event, EventId(index));
                assert!(talk.links.iter().all(|l| l.talk == *talk_id));
            }
        }
        for city in root.cities() {
            for venue_id in city.venues.values() {
                assert_eq!(root.city(root.venue(*venue_id).city).slug, city.slug);
            }
        }
    }

    #[test]
    fn test_events_sorted() {
        let root = sample();
        assert!(root.events().windows(2).all(|w| w[0].start <= w[1].start));
        for series in root.all_series() {
            let starts: Vec<_> = root.events_of(series).map(|e| e.start).collect();
            assert!(starts.windows(2).all(|w| w[0] < w[1]));
        }
        let total: usize = root.all_series().iter().map(|s| s.events.len()).sum();
        assert_eq!(total, root.events().len());
    }

    #[test]
    fn test_venue_index() {
        let root = sample();
        assert_eq!(root.venues().len(), 3);
        for venue in root.venues() {
            let owners = root
                .cities()
                .iter()
                .filter(|c| c.venues.contains_key(&venue.slug))
                .count();
            assert_eq!(owners, 1);
            assert_eq!(root.venue_by_slug(&venue.slug), Some(venue));
        }
        assert_eq!(
            root.venue_by_slug("u-dreveneho-orla").unwrap().short_address(),
            Some("Minská 17")
        );
    }

    #[test]
    fn test_duplicate_venue_slug_fails() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        write_tree(
            dir.path(),
            &[(
                "cities/praha/venues/hlavni-nadrazi.yaml",
                "name: Hlavní nádraží\nlocation: {latitude: '50.08', longitude: '14.43'}\n",
            )],
        );

        let err = load_root(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateVenue(slug) if slug == "hlavni-nadrazi"));
    }

    #[test]
    fn test_missing_event_name_fails() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        write_tree(
            dir.path(),
            &[(
                "series/praha-pyvo/events/2024-07-17.yaml",
                "city: praha\nstart: 2024-07-17\n",
            )],
        );

        let err = load_root(dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "series/praha-pyvo/events/2024-07-17.yaml: missing required field `name`"
        );
    }

    #[test]
    fn test_unknown_venue_fails() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        write_tree(
            dir.path(),
            &[(
                "series/praha-pyvo/events/2024-07-17.yaml",
                "name: P\ncity: praha\nvenue: nowhere\nstart: 2024-07-17\n",
            )],
        );

        assert!(matches!(
            load_root(dir.path()),
            Err(LoadError::UnknownReference { kind: "venue", .. })
        ));
    }

    #[test]
    fn test_lookups_report_absence() {
        let root = sample();
        assert!(root.series_by_slug("ostrava-pyvo").is_none());
        assert!(root.venue_by_slug("nowhere").is_none());
        assert!(root.event_in_series("brno-pyvo", "1999-01").is_none());
        assert!(root.events_in_city("ostrava").is_empty());
        assert_eq!(root.events_in_city("brno").len(), 2);
    }

    #[test]
    fn test_latest_events_upcoming_first() {
        let root = sample();
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let latest: Vec<_> = root
            .latest_events(today)
            .into_iter()
            .map(|e| root.series_of(e).slug.as_str())
            .collect();
        assert_eq!(latest, ["brno-pyvo", "praha-pyvo"]);

        let later = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let latest: Vec<_> = root.latest_events(later).iter().map(|e| e.date()).collect();
        assert_eq!(
            latest,
            [
                NaiveDate::from_ymd_opt(2024, 6, 27).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 19).unwrap()
            ]
        );
    }

    #[test]
    fn test_videos() {
        let root = sample();
        let videos = root.videos(12);
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].link.youtube_id(), Some("abcDEF_123"));
        assert_eq!(videos[0].talk.title, "Django v praxi");
        assert_eq!(videos[0].event.number, Some(100));
        assert!(root.videos(0).is_empty());
    }

    #[test]
    fn test_sample_has_readme_ignored() {
        assert!(SAMPLE.iter().any(|(name, _)| *name == "README.md"));
        let root = sample();
        assert_eq!(root.cities().len(), 2);
    }
}
