//! RSS and Atom renderings of [`FeedEntry`] lists.

use atom_syndication::{EntryBuilder, FeedBuilder, LinkBuilder, Text};
use chrono::Utc;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::entries::FeedEntry;

/// Channel-level metadata shared by both formats.
#[derive(Debug, Clone)]
pub struct FeedInfo {
    pub title: String,
    pub subtitle: String,
    /// Site the feed describes.
    pub site_url: String,
    /// Where the feed itself is served.
    pub self_url: String,
}

impl FeedInfo {
    pub fn pyvo(base_url: &str, self_url: impl Into<String>) -> Self {
        Self {
            title: "Pyvo".to_string(),
            subtitle: "Srazy Pyvo.cz".to_string(),
            site_url: base_url.to_string(),
            self_url: self_url.into(),
        }
    }
}

pub fn to_rss(info: &FeedInfo, entries: &[FeedEntry]) -> String {
    let items: Vec<rss::Item> = entries
        .iter()
        .map(|entry| {
            ItemBuilder::default()
                .title(Some(entry.title.clone()))
                .link(Some(entry.url.clone()))
                .guid(Some(
                    GuidBuilder::default()
                        .value(entry.id.clone())
                        .permalink(true)
                        .build(),
                ))
                .description(entry.summary.clone())
                .pub_date(Some(entry.published.to_rfc2822()))
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(info.title.clone())
        .link(info.site_url.clone())
        .description(info.subtitle.clone())
        .items(items)
        .build()
        .to_string()
}

pub fn to_atom(info: &FeedInfo, entries: &[FeedEntry]) -> String {
    let atom_entries: Vec<atom_syndication::Entry> = entries
        .iter()
        .map(|entry| {
            EntryBuilder::default()
                .id(entry.id.clone())
                .title(Text::plain(entry.title.clone()))
                .links(vec![LinkBuilder::default()
                    .href(entry.url.clone())
                    .rel("alternate")
                    .build()])
                .summary(entry.summary.clone().map(Text::plain))
                .published(Some(entry.published.fixed_offset()))
                .updated(entry.updated.fixed_offset())
                .build()
        })
        .collect();

    // Entries arrive newest first.
    let updated = entries
        .first()
        .map(|newest| newest.updated.fixed_offset())
        .unwrap_or_else(|| Utc::now().fixed_offset());

    FeedBuilder::default()
        .id(info.site_url.clone())
        .title(Text::plain(info.title.clone()))
        .subtitle(Some(Text::plain(info.subtitle.clone())))
        .links(vec![LinkBuilder::default()
            .href(info.self_url.clone())
            .rel("self")
            .build()])
        .updated(updated)
        .entries(atom_entries)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::feed_entries;
    use pyvo_core::fixtures::write_sample;
    use pyvo_core::load_root;
    use tempfile::tempdir;

    fn entries() -> Vec<FeedEntry> {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let root = load_root(dir.path()).unwrap();
        feed_entries(&root, root.events().iter(), "https://pyvo.cz")
    }

    fn info() -> FeedInfo {
        FeedInfo::pyvo("https://pyvo.cz", "https://pyvo.cz/api/pyvo.rss")
    }

    #[test]
    fn test_rss() {
        let rss = to_rss(&info(), &entries());

        assert!(rss.contains("<rss"));
        assert!(rss.contains("<title>Brněnské Pyvo #100 Web</title>"));
        assert!(rss.contains("https://pyvo.cz/brno-pyvo/2024-06/"));
        assert!(rss.contains("<pubDate>Thu, 27 Jun 2024 19:30:00 +0200</pubDate>"));
        assert_eq!(rss.matches("<item>").count(), 3);
        let newest = rss.find("2024-06/").unwrap();
        let oldest = rss.find("2024-05/").unwrap();
        assert!(newest < oldest);
    }

    #[test]
    fn test_atom() {
        let atom = to_atom(&info(), &entries());

        assert!(atom.contains("<feed"));
        assert!(atom.contains("<id>https://pyvo.cz/brno-pyvo/2024-06/</id>"));
        assert!(atom.contains("2024-06-27T19:30:00+02:00"));
        assert!(atom.contains("rel=\"self\""));
        assert_eq!(atom.matches("<entry>").count(), 3);
    }

    #[test]
    fn test_empty_feeds() {
        assert!(!to_rss(&info(), &[]).contains("<item>"));
        assert!(!to_atom(&info(), &[]).contains("<entry>"));
    }
}
