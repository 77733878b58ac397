use std::collections::BTreeMap;
use std::path::PathBuf;

use rrule::{RRule, Unvalidated};

use crate::build::Record;
use crate::error::LoadError;
use crate::event::EventDraft;
use crate::ids::{CityId, EventId, VenueId};
use crate::recurrence::parse_rule;

/// Contact details of a series organizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    pub name: String,
    pub phone: Option<String>,
    pub mail: Option<String>,
    pub web: Option<String>,
}

/// The schedule a series usually follows.
#[derive(Debug, Clone)]
pub struct Recurrence {
    /// RFC 5545 recurrence rule, as written in the data.
    pub rule: String,
    /// Basic type of the scheme, e.g. `monthly`.
    pub scheme: String,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
    pub(crate) parsed: RRule<Unvalidated>,
}

impl Recurrence {
    pub fn is_monthly(&self) -> bool {
        self.scheme == "monthly"
    }

    fn build(record: &Record<'_>) -> Result<Self, LoadError> {
        let rule = record.str("rrule")?;
        let parsed = parse_rule(rule).map_err(|reason| LoadError::InvalidRecurrence {
            origin: record.origin().to_string(),
            rule: rule.to_string(),
            reason,
        })?;
        let description = record.record("description")?;
        Ok(Self {
            rule: rule.to_string(),
            scheme: record.str("scheme")?.to_string(),
            description_cs: description.opt_string("cs")?,
            description_en: description.opt_string("en")?,
            parsed,
        })
    }
}

impl PartialEq for Recurrence {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
            && self.scheme == other.scheme
            && self.description_cs == other.description_cs
            && self.description_en == other.description_en
    }
}

/// A series of events, e.g. the monthly meetup of one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Unique identifier for use in URLs.
    pub slug: String,
    /// City the series usually takes place in.
    pub home_city: CityId,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
    /// Sorted by start, ascending.
    pub events: Vec<EventId>,
    pub organizers: Vec<Organizer>,
    pub recurrence: Option<Recurrence>,
    /// Path of `series.yaml`, relative to the data root.
    pub source: PathBuf,
}

#[derive(Debug)]
pub(crate) struct SeriesDraft {
    pub name: String,
    pub slug: String,
    pub home_city: CityId,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
    pub events: Vec<EventDraft>,
    pub organizers: Vec<Organizer>,
    pub recurrence: Option<Recurrence>,
    pub source: PathBuf,
}

impl SeriesDraft {
    /// Build from a series directory: `series.yaml` plus an optional `events/`.
    pub fn build(
        slug: &str,
        dir: &Record<'_>,
        cities: &BTreeMap<String, CityId>,
        venues: &BTreeMap<String, VenueId>,
    ) -> Result<Self, LoadError> {
        let info = dir.record("series")?;

        let city_slug = info.str("city")?;
        let home_city = *cities
            .get(city_slug)
            .ok_or_else(|| LoadError::UnknownReference {
                origin: info.origin().to_string(),
                kind: "city",
                slug: city_slug.to_string(),
            })?;

        let description = info.record("description")?;

        let organizers = info
            .list("organizer-info")?
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let record = info.child(value, format_args!("organizer-info[{i}]"))?;
                Ok(Organizer {
                    name: record.str("name")?.to_string(),
                    phone: record.opt_string("phone")?,
                    mail: record.opt_string("mail")?,
                    web: record.opt_string("web")?,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let recurrence = info
            .opt_record("recurrence")?
            .map(|r| Recurrence::build(&r))
            .transpose()?;

        let events = dir
            .entries("events")?
            .into_iter()
            .map(|(event_slug, value)| {
                let record = dir.child(value, format_args!("events.{event_slug}"))?;
                EventDraft::build(&record, cities, venues)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: info.str("name")?.to_string(),
            slug: slug.to_string(),
            home_city,
            description_cs: description.opt_string("cs")?,
            description_en: description.opt_string("en")?,
            events,
            organizers,
            recurrence,
            source: info.source()?,
        })
    }
}
