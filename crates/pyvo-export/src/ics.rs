use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike, EventStatus};

use crate::entries::{CalendarEntry, EntryStatus};

/// Render entries as an iCalendar document.
///
/// `stamp` becomes the DTSTAMP of every event.
pub fn to_ics(name: &str, entries: &[CalendarEntry], stamp: DateTime<Utc>) -> String {
    let mut calendar = Calendar::new();
    calendar.name(name);

    for entry in entries {
        let mut event = Event::new();
        event
            .uid(&entry.uid)
            .summary(&entry.title)
            .timestamp(stamp)
            .starts(entry.start.with_timezone(&Utc))
            .status(match entry.status {
                EntryStatus::Confirmed => EventStatus::Confirmed,
                EntryStatus::Tentative => EventStatus::Tentative,
            })
            .add_property("CATEGORIES", entry.status.category());
        if let Some(location) = &entry.location {
            event.location(location);
        }
        if let Some(description) = &entry.description {
            event.description(description);
        }
        if let Some((latitude, longitude)) = &entry.geo {
            event.add_property("GEO", format!("{latitude};{longitude}"));
        }
        calendar.push(event.done());
    }

    calendar.to_string()
}
