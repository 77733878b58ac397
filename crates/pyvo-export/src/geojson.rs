use pyvo_core::Venue;
use serde_json::{json, Value};

/// A FeatureCollection holding one Point for the venue.
///
/// Coordinates stay the strings they were written as, longitude first.
pub fn venue_geojson(venue: &Venue) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "name": venue.name,
                    "address": venue.address,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [venue.longitude(), venue.latitude()],
                },
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyvo_core::fixtures::write_sample;
    use pyvo_core::load_root;
    use tempfile::tempdir;

    #[test]
    fn test_venue_feature() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let root = load_root(dir.path()).unwrap();
        let venue = root.venue_by_slug("na-venecku").unwrap();

        let geo = venue_geojson(venue);
        assert_eq!(geo["type"], "FeatureCollection");
        let feature = &geo["features"][0];
        assert_eq!(feature["properties"]["name"], "Na Věnečku");
        assert_eq!(feature["properties"]["address"], "Lidická 8, Praha 5");
        assert_eq!(feature["geometry"]["coordinates"], json!(["14.4048", "50.0706"]));
    }

    #[test]
    fn test_missing_address_is_null() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let root = load_root(dir.path()).unwrap();

        let geo = venue_geojson(root.venue_by_slug("hlavni-nadrazi").unwrap());
        assert!(geo["features"][0]["properties"]["address"].is_null());
    }
}
