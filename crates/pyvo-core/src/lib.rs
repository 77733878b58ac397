//! Pyvo Core - the meetup data model.
//!
//! Loads the YAML data tree into a typed, validated object graph and
//! answers the read-only queries the website needs: event listings,
//! recurrence projections and calendar grids.

mod build;
pub mod calendar;
pub mod city;
pub mod error;
pub mod event;
pub mod holidays;
pub mod ids;
pub mod loader;
pub mod recurrence;
pub mod root;
pub mod series;
pub mod store;
pub mod time;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

use std::path::Path;

// Re-exports for convenience
pub use calendar::{default_window, get_calendar, Day, MonthGrid};
pub use chrono_tz::Tz;
pub use city::{City, Location, Venue};
pub use error::{LoadError, ValidationError};
pub use event::{Event, EventLink, Speaker, Talk, TalkLink};
pub use holidays::{CzechHolidays, Holiday, HolidayCalendar};
pub use ids::{CityId, EventId, SeriesId, TalkId, VenueId};
pub use loader::{load_tree, Meta};
pub use recurrence::{next_occurrences, Occurrences};
pub use root::{Root, Video};
pub use series::{Organizer, Recurrence, Series};
pub use store::DataStore;
pub use time::TIMEZONE;

/// Load, build and validate the data tree at `dir`.
pub fn load_root(dir: &Path) -> Result<Root, LoadError> {
    let (_meta, tree) = load_tree(dir)?;
    Root::from_tree(&tree)
}
