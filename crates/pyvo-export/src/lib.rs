//! Pyvo Export - calendar and feed materialization.
//!
//! Turns event sequences from `pyvo-core` into calendar and feed entries
//! and serializes them as iCalendar, RSS, Atom and GeoJSON.

pub mod entries;
pub mod event_add;
pub mod geojson;
pub mod ics;
pub mod syndication;

pub use entries::{
    calendar_entries, event_uid, event_url, feed_entries, CalendarEntry, EntryStatus, FeedEntry,
    Lang,
};
pub use event_add::event_add_link;
pub use geojson::venue_geojson;
pub use ics::to_ics;
pub use syndication::{to_atom, to_rss, FeedInfo};
