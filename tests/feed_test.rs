use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use news_router::publishers::format_item;
use news_router::sources::entry_to_item;
use news_router::{FeedSource, FeedSourceParams, Item, ItemParams, Source, SourceInfo};

fn source_info(name: &str) -> SourceInfo {
    SourceInfo {
        name: name.into(),
        categories: Vec::new(),
        cooldown: Duration::from_secs(60),
        mute_interval: Default::default(),
    }
}

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
<title>Example Channel</title>
<item>
  <title>First headline</title>
  <link>https://example.com/1</link>
  <category>tech</category>
  <pubDate>Tue, 01 Jul 2025 10:00:00 GMT</pubDate>
</item>
<item>
  <title></title>
  <link>https://example.com/2</link>
</item>
<item>
  <title>Second headline</title>
  <link>https://example.com/3</link>
</item>
</channel>
</rss>"#;

#[test]
fn converts_feed_entries_to_items() {
    let feed = feed_rs::parser::parse(RSS.as_bytes()).unwrap();
    let src = Arc::new(source_info("example"));

    let mut items = Vec::new();
    let mut skipped = 0;
    for entry in feed.entries {
        match entry_to_item(entry, &src) {
            Ok(item) => items.push(item),
            Err(_) => skipped += 1,
        }
    }

    assert_eq!(items.len(), 2);
    assert_eq!(skipped, 1, "entries without a title are rejected at the boundary");

    assert_eq!(items[0].title, "First headline");
    assert_eq!(items[0].link, "https://example.com/1");
    assert_eq!(items[0].categories, vec!["tech"]);
    assert!(items[0].published.is_some());
    assert_eq!(items[0].words().join(" "), "First headline");
    assert_eq!(items[0].src.name, "example");

    assert_ne!(items[0].key(), items[1].key());
}

#[test]
fn feed_source_validates_construction() {
    assert!(FeedSource::new(FeedSourceParams {
        info: source_info("no-links"),
        links: vec![],
        client: None,
    })
    .is_err());

    assert!(FeedSource::new(FeedSourceParams {
        info: source_info("  "),
        links: vec!["https://example.com/rss".into()],
        client: None,
    })
    .is_err());

    assert!(FeedSource::new(FeedSourceParams {
        info: source_info("bad-link"),
        links: vec!["not a url".into()],
        client: None,
    })
    .is_err());

    let src = FeedSource::new(FeedSourceParams {
        info: SourceInfo {
            cooldown: Duration::ZERO,
            ..source_info("ok")
        },
        links: vec!["https://example.com/rss".into()],
        client: None,
    })
    .unwrap();
    assert_eq!(
        src.info().cooldown,
        Duration::from_secs(900),
        "zero cooldown falls back to the default"
    );
}

#[test]
fn formats_item_message() {
    let src = Arc::new(source_info("example"));
    let item = Item::new(ItemParams {
        src,
        title: "Big news".into(),
        link: "https://example.com/x".into(),
        categories: Vec::new(),
        published: Some(Utc.with_ymd_and_hms(2025, 7, 1, 10, 30, 0).unwrap()),
    })
    .unwrap();

    let msg = format_item(&item);
    assert!(msg.contains("Big news"));
    assert!(msg.contains("https://example.com/x"));
    assert!(msg.contains("01.07 10:30"));

    let undated = Item::new(ItemParams {
        src: Arc::new(source_info("example")),
        title: "Short".into(),
        link: "https://example.com/y".into(),
        categories: Vec::new(),
        published: None,
    })
    .unwrap();
    assert_eq!(format_item(&undated), "Short https://example.com/y");
}
