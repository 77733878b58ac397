use std::collections::BTreeMap;

use crate::build::Record;
use crate::error::LoadError;
use crate::ids::{CityId, VenueId};

/// Geographic coordinates, kept verbatim as written in the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub latitude: String,
    pub longitude: String,
}

impl Location {
    pub(crate) fn build(record: &Record<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            latitude: record.str("latitude")?.to_string(),
            longitude: record.str("longitude")?.to_string(),
        })
    }
}

/// A city that holds events.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    /// Unique identifier for use in URLs.
    pub slug: String,
    pub location: Location,
    /// Venues in (or near) this city, by slug.
    pub venues: BTreeMap<String, VenueId>,
}

/// A venue to hold events in.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub name: String,
    /// Unique across all cities.
    pub slug: String,
    /// The city owning this venue.
    pub city: CityId,
    pub address: Option<String>,
    /// Directions and other practical notes.
    pub notes: Option<String>,
    pub location: Location,
}

impl Venue {
    /// First line of the address.
    pub fn short_address(&self) -> Option<&str> {
        self.address.as_deref().and_then(|a| a.lines().next())
    }

    pub fn latitude(&self) -> &str {
        &self.location.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.location.longitude
    }
}

/// A city as read from `cities/<slug>/`, before ids are assigned.
#[derive(Debug)]
pub(crate) struct CityDraft {
    pub name: String,
    pub slug: String,
    pub location: Location,
    pub venues: Vec<VenueDraft>,
}

#[derive(Debug)]
pub(crate) struct VenueDraft {
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub location: Location,
}

impl CityDraft {
    /// Build from a city directory: `city.yaml` plus an optional `venues/`.
    pub fn build(slug: &str, dir: &Record<'_>) -> Result<Self, LoadError> {
        let city = dir.record("city")?;
        let venues = dir
            .entries("venues")?
            .into_iter()
            .map(|(venue_slug, value)| {
                let record = dir.child(value, format_args!("venues.{venue_slug}"))?;
                VenueDraft::build(venue_slug, &record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: city.str("name")?.to_string(),
            slug: slug.to_string(),
            location: Location::build(&city.record("location")?)?,
            venues,
        })
    }
}

impl VenueDraft {
    fn build(slug: &str, record: &Record<'_>) -> Result<Self, LoadError> {
        Ok(Self {
            name: record.str("name")?.to_string(),
            slug: slug.to_string(),
            address: record.opt_string("address")?,
            notes: record.opt_string("notes")?,
            location: Location::build(&record.record("location")?)?,
        })
    }

    /// Attach the owning city, producing the final venue.
    pub fn finish(self, city: CityId) -> Venue {
        Venue {
            name: self.name,
            slug: self.slug,
            city,
            address: self.address,
            notes: self.notes,
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(address: Option<&str>) -> Venue {
        Venue {
            name: "Konvikt".to_string(),
            slug: "konvikt".to_string(),
            city: CityId(0),
            address: address.map(str::to_string),
            notes: None,
            location: Location {
                latitude: "50.08".to_string(),
                longitude: "14.41".to_string(),
            },
        }
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            venue(Some("Bartolomějská 11\nPraha 1")).short_address(),
            Some("Bartolomějská 11")
        );
        assert_eq!(venue(None).short_address(), None);
    }

    #[test]
    fn test_coordinates() {
        let v = venue(None);
        assert_eq!(v.latitude(), "50.08");
        assert_eq!(v.longitude(), "14.41");
    }

    #[test]
    fn test_city_draft_requires_location() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("city:\n  name: Brno\n  _source: cities/brno/city.yaml\n").unwrap();
        let dir = Record::new(&value, "cities/brno").unwrap();

        let err = CityDraft::build("brno", &dir).unwrap_err();
        assert!(err.to_string().contains("cities/brno/city.yaml"));
        assert!(err.to_string().contains("location"));
    }
}
