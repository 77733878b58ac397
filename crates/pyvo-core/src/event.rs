use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use regex::Regex;
use serde_yaml::Value;
use url::Url;

use crate::build::Record;
use crate::error::LoadError;
use crate::ids::{CityId, EventId, SeriesId, TalkId, VenueId};
use crate::time::parse_start;

fn youtube_re() -> &'static Regex {
    static YOUTUBE_RE: OnceLock<Regex> = OnceLock::new();
    YOUTUBE_RE.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.youtube\.com/watch\?v=|youtu\.be/)([-0-9a-zA-Z_]+)")
            .expect("YouTube pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub name: String,
}

/// A link attached to a talk: slides, a recording, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkLink {
    /// `"video"` for recordings; `None` for plain links.
    pub kind: Option<String>,
    pub url: String,
    pub talk: TalkId,
}

impl TalkLink {
    pub fn is_video(&self) -> bool {
        self.kind.as_deref() == Some("video")
    }

    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Video id if the URL has one of the known YouTube shapes.
    pub fn youtube_id(&self) -> Option<&str> {
        youtube_re()
            .captures(&self.url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Talk {
    pub title: String,
    pub description: Option<String>,
    pub links: Vec<TalkLink>,
    pub speakers: Vec<Speaker>,
    pub is_lightning: bool,
    pub event: EventId,
}

impl Talk {
    /// YouTube id of the first link that has one.
    pub fn youtube_id(&self) -> Option<&str> {
        self.links.iter().find_map(TalkLink::youtube_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLink {
    pub url: String,
}

/// One meetup.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// General name; often the same as the series name.
    pub name: String,
    pub venue: Option<VenueId>,
    /// Serial number, if the series keeps track.
    pub number: Option<i64>,
    /// Topic or sub-title.
    pub topic: Option<String>,
    pub city: CityId,
    /// Markdown.
    pub description: Option<String>,
    pub start: DateTime<Tz>,
    pub talks: Vec<TalkId>,
    pub links: Vec<EventLink>,
    /// Path the event was loaded from, relative to the data root.
    pub source: PathBuf,
    pub series: SeriesId,
}

impl Event {
    /// `name #N topic`, or `name – topic` when there is no number.
    pub fn title(&self) -> String {
        let mut parts = vec![self.name.clone()];
        match (self.number, &self.topic) {
            (Some(number), _) => parts.push(format!("#{number}")),
            (None, Some(_)) => parts.push("–".to_string()),
            (None, None) => {}
        }
        if let Some(topic) = &self.topic {
            parts.push(topic.clone());
        }
        parts.join(" ")
    }

    /// Identifier for URLs, unique within the series.
    pub fn slug(&self) -> String {
        self.date().format("%Y-%m").to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }
}

#[derive(Debug)]
pub(crate) struct LinkDraft {
    pub kind: Option<String>,
    pub url: String,
}

#[derive(Debug)]
pub(crate) struct TalkDraft {
    pub title: String,
    pub description: Option<String>,
    pub links: Vec<LinkDraft>,
    pub speakers: Vec<Speaker>,
    pub is_lightning: bool,
}

/// An event as read from YAML, with references resolved but no ids assigned.
#[derive(Debug)]
pub(crate) struct EventDraft {
    pub name: String,
    pub venue: Option<VenueId>,
    pub number: Option<i64>,
    pub topic: Option<String>,
    pub city: CityId,
    pub description: Option<String>,
    pub start: DateTime<Tz>,
    pub talks: Vec<TalkDraft>,
    pub links: Vec<EventLink>,
    pub source: PathBuf,
}

impl EventDraft {
    pub fn build(
        record: &Record<'_>,
        cities: &BTreeMap<String, CityId>,
        venues: &BTreeMap<String, VenueId>,
    ) -> Result<Self, LoadError> {
        let city_slug = record.str("city")?;
        let city = *cities
            .get(city_slug)
            .ok_or_else(|| LoadError::UnknownReference {
                origin: record.origin().to_string(),
                kind: "city",
                slug: city_slug.to_string(),
            })?;

        let venue = match record.opt_str("venue")? {
            Some(slug) if !slug.is_empty() => Some(*venues.get(slug).ok_or_else(|| {
                LoadError::UnknownReference {
                    origin: record.origin().to_string(),
                    kind: "venue",
                    slug: slug.to_string(),
                }
            })?),
            _ => None,
        };

        let start_text = record.str("start")?;
        let start = parse_start(start_text).ok_or_else(|| LoadError::InvalidField {
            origin: record.origin().to_string(),
            field: "start".to_string(),
            expected: "a date or a date with time of day",
        })?;

        let talks = record
            .list("talks")?
            .iter()
            .enumerate()
            .map(|(i, value)| TalkDraft::build(&record.child(value, format_args!("talks[{i}]"))?))
            .collect::<Result<Vec<_>, _>>()?;

        let links = record
            .str_list("urls")?
            .into_iter()
            .map(|url| EventLink {
                url: url.to_string(),
            })
            .collect();

        Ok(Self {
            name: record.str("name")?.to_string(),
            venue,
            number: record.opt_int("number")?,
            topic: record.opt_string("topic")?,
            city,
            description: record.opt_string("description")?,
            start,
            talks,
            links,
            source: record.source()?,
        })
    }

    /// Attach ids and the owning series, producing the final event.
    /// The finished `talks` must already point back at this event.
    pub fn finish(self, series: SeriesId, talks: Vec<TalkId>) -> Event {
        Event {
            name: self.name,
            venue: self.venue,
            number: self.number,
            topic: self.topic,
            city: self.city,
            description: self.description,
            start: self.start,
            talks,
            links: self.links,
            source: self.source,
            series,
        }
    }
}

impl TalkDraft {
    fn build(record: &Record<'_>) -> Result<Self, LoadError> {
        let mut links: Vec<LinkDraft> = record
            .str_list("urls")?
            .into_iter()
            .map(|url| LinkDraft {
                kind: None,
                url: url.to_string(),
            })
            .collect();
        for coverage in record.list("coverage")? {
            links.push(LinkDraft::from_coverage(record, coverage)?);
        }

        let speakers = record
            .str_list("speakers")?
            .into_iter()
            .map(|name| Speaker {
                name: name.to_string(),
            })
            .collect();

        Ok(Self {
            title: record.str("title")?.to_string(),
            description: record.opt_string("description")?,
            links,
            speakers,
            is_lightning: record.bool_or("lightning", false)?,
        })
    }

    pub fn finish(self, id: TalkId, event: EventId) -> Talk {
        Talk {
            title: self.title,
            description: self.description,
            links: self
                .links
                .into_iter()
                .map(|link| TalkLink {
                    kind: link.kind,
                    url: link.url,
                    talk: id,
                })
                .collect(),
            speakers: self.speakers,
            is_lightning: self.is_lightning,
            event,
        }
    }
}

impl LinkDraft {
    /// A coverage entry is a single-entry mapping `{kind: url}`.
    fn from_coverage(talk: &Record<'_>, value: &Value) -> Result<Self, LoadError> {
        let invalid = || LoadError::InvalidField {
            origin: talk.origin().to_string(),
            field: "coverage".to_string(),
            expected: "a list of single-entry `kind: url` mappings",
        };
        let map = value.as_mapping().ok_or_else(invalid)?;
        let mut entries = map.iter();
        match (entries.next(), entries.next()) {
            (Some((Value::String(kind), Value::String(url))), None) => Ok(Self {
                kind: Some(kind.clone()),
                url: url.clone(),
            }),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TIMEZONE;
    use chrono::TimeZone;

    fn event(number: Option<i64>, topic: Option<&str>) -> Event {
        Event {
            name: "Brněnské Pyvo".to_string(),
            venue: None,
            number,
            topic: topic.map(str::to_string),
            city: CityId(0),
            description: None,
            start: TIMEZONE.with_ymd_and_hms(2024, 6, 27, 19, 0, 0).unwrap(),
            talks: Vec::new(),
            links: Vec::new(),
            source: PathBuf::from("series/brno-pyvo/events/2024-06-27.yaml"),
            series: SeriesId(0),
        }
    }

    fn link(url: &str) -> TalkLink {
        TalkLink {
            kind: None,
            url: url.to_string(),
            talk: TalkId(0),
        }
    }

    #[test]
    fn test_title() {
        assert_eq!(event(None, None).title(), "Brněnské Pyvo");
        assert_eq!(event(Some(100), None).title(), "Brněnské Pyvo #100");
        assert_eq!(event(Some(100), Some("Web")).title(), "Brněnské Pyvo #100 Web");
        assert_eq!(event(None, Some("Web")).title(), "Brněnské Pyvo – Web");
    }

    #[test]
    fn test_slug_and_date() {
        let e = event(None, None);
        assert_eq!(e.slug(), "2024-06");
        assert_eq!(e.date(), NaiveDate::from_ymd_opt(2024, 6, 27).unwrap());
        assert_eq!(e.start_time(), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
    }

    #[test]
    fn test_youtube_id() {
        assert_eq!(
            link("https://www.youtube.com/watch?v=abcDEF_123").youtube_id(),
            Some("abcDEF_123")
        );
        assert_eq!(link("http://youtu.be/x-Y_z").youtube_id(), Some("x-Y_z"));
        assert_eq!(link("https://vimeo.com/123").youtube_id(), None);
    }

    #[test]
    fn test_hostname() {
        assert_eq!(
            link("https://www.youtube.com/watch?v=a").hostname().as_deref(),
            Some("www.youtube.com")
        );
        assert_eq!(link("not a url").hostname(), None);
    }

    #[test]
    fn test_coverage_must_have_one_entry() {
        let value: Value = serde_yaml::from_str(
            "title: T\ncoverage:\n  - video: https://a\n    slides: https://b\n",
        )
        .unwrap();
        let record = Record::new(&value, "talk").unwrap();
        assert!(matches!(
            TalkDraft::build(&record),
            Err(LoadError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_talk_links_keep_order() {
        let value: Value = serde_yaml::from_str(
            "title: T\nurls: [https://slides]\ncoverage:\n  - video: https://youtu.be/abc\n",
        )
        .unwrap();
        let record = Record::new(&value, "talk").unwrap();
        let talk = TalkDraft::build(&record).unwrap().finish(TalkId(4), EventId(2));

        assert_eq!(talk.links.len(), 2);
        assert_eq!(talk.links[0].kind, None);
        assert!(talk.links[1].is_video());
        assert!(talk.links.iter().all(|l| l.talk == TalkId(4)));
        assert_eq!(talk.event, EventId(2));
        assert_eq!(talk.youtube_id(), Some("abc"));
    }
}
