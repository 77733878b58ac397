//! Prefilled GitHub link for adding the next event of a series.

use url::form_urlencoded;

use pyvo_core::{next_occurrences, Root, Series};

const NEW_FILE_URL: &str = "https://github.com/pyvec/pyvo-data/new/master/series";

/// Venues of this many recent events are suggested.
const RECENT_EVENTS: usize = 12;
const SUGGESTED_VENUES: usize = 5;

const PLACEHOLDER: &str = "...";

/// Build a GitHub "new file" URL with a YAML skeleton for the next event.
///
/// Values that cannot be derived from history (no events, no recurrence
/// rule) are left as `...` for the author to fill in.
pub fn event_add_link(root: &Root, series: &Series) -> String {
    let mut city = PLACEHOLDER.to_string();
    let mut venue = PLACEHOLDER.to_string();
    let mut number = String::new();
    let mut next_date = PLACEHOLDER.to_string();
    let mut next_start = PLACEHOLDER.to_string();

    if let Some(last) = root.last_event(series) {
        city = root.city_of(last).slug.clone();
        if let Some(n) = last.number {
            number = format!("number: {}", n + 1);
        }

        let suggested = common_venues(root, series);
        if let Some((first, rest)) = suggested.split_first() {
            venue = first.to_string();
            if !rest.is_empty() {
                venue.push_str(&format!("   # {} ?", rest.join(", ")));
            }
        }
    }

    if let Some(next) = next_occurrences(root, series, Some(1), None).iter().next() {
        next_start = next.naive_local().format("%Y-%m-%d %H:%M:%S").to_string();
        next_date = next.date_naive().to_string();
    }

    let skeleton = format!(
        "name: {name}
city: {city}
venue: {venue}
start: {next_start}
# topic: ...
{number}
description: |
    ...

talks:
  - title: ...
    description: |
        ...
    lightning: false
    speakers:
        - ...
        - ...
",
        name = series.name,
    );

    let home_city = &root.city(series.home_city).name;
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("filename", &format!("{next_date}.yaml"))
        .append_pair("value", &skeleton)
        .append_pair("message", &format!("{home_city}: Add entry for {next_date}"))
        .finish();

    format!("{NEW_FILE_URL}/{}/events/f?{params}", series.slug)
}

/// Venue slugs of recent events, most used first; ties keep the order of
/// first appearance.
fn common_venues<'a>(root: &'a Root, series: &'a Series) -> Vec<&'a str> {
    let events = root.events_of(series);
    let skip = events.len().saturating_sub(RECENT_EVENTS);

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for event in events.skip(skip) {
        let Some(venue) = root.venue_of(event) else {
            continue;
        };
        match counts.iter_mut().find(|(slug, _)| *slug == venue.slug) {
            Some((_, count)) => *count += 1,
            None => counts.push((venue.slug.as_str(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(SUGGESTED_VENUES)
        .map(|(slug, _)| slug)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyvo_core::fixtures::write_sample;
    use pyvo_core::load_root;
    use std::collections::HashMap;
    use tempfile::tempdir;
    use url::Url;

    fn params(link: &str) -> (Url, HashMap<String, String>) {
        let url = Url::parse(link).unwrap();
        let params = url.query_pairs().into_owned().collect();
        (url, params)
    }

    #[test]
    fn test_link_for_recurring_series() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let root = load_root(dir.path()).unwrap();
        let series = root.series_by_slug("brno-pyvo").unwrap();

        let (url, params) = params(&event_add_link(&root, series));
        assert_eq!(
            url.path(),
            "/pyvec/pyvo-data/new/master/series/brno-pyvo/events/f"
        );
        assert_eq!(params["filename"], "2024-07-25.yaml");
        assert_eq!(params["message"], "Brno: Add entry for 2024-07-25");

        let value = &params["value"];
        assert!(value.starts_with("name: Brněnské Pyvo\ncity: brno\n"));
        assert!(value.contains("venue: hlavni-nadrazi   # u-dreveneho-orla ?\n"));
        assert!(value.contains("start: 2024-07-25 19:00:00\n"));
        assert!(value.contains("\nnumber: 101\n"));
    }

    #[test]
    fn test_link_without_rule_or_numbers() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let root = load_root(dir.path()).unwrap();
        let series = root.series_by_slug("praha-pyvo").unwrap();

        let (_, params) = params(&event_add_link(&root, series));
        assert_eq!(params["filename"], "....yaml");
        let value = &params["value"];
        assert!(value.contains("venue: na-venecku\n"));
        assert!(value.contains("start: ...\n"));
        assert!(!value.contains("number:"));
    }
}
