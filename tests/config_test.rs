use news_router::{build_pipeline, Config, DayInterval};

const SAMPLE: &str = r#"
tick = 30
chan_size = 64
dedup_size = 256
mute_hours = [1, 7]

[src.lenta]
links = ["https://lenta.ru/rss"]
cooldown = 900

[src."reuters.world"]
links = ["https://example.com/feed.xml"]
cooldown = 600
categories = ["world"]

[pub.telegram]
get_url = "https://api.example.com/send?text={}"
send_pause = 1

[[filters]]
cond = "gazprom; oil & price"
sources = []
pubs = []
"#;

#[tokio::test]
async fn parses_and_builds_a_runnable_pipeline() {
    let config = Config::from_toml(SAMPLE).unwrap();
    assert_eq!(config.tick, Some(30));
    assert_eq!(config.chan_size, Some(64));
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.pubs.len(), 1);
    assert_eq!(config.filters.len(), 1);

    let (mut pipeline, errors) = build_pipeline(&config);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    pipeline.start().unwrap();
    pipeline.stop();
    pipeline.wait().await;
}

#[test]
fn build_collects_every_error() {
    let text = r#"
mute_hours = [30, 2]

[src.broken]
links = []

[pub.broken]
get_url = "https://example.com/send"

[[filters]]
cond = "a(("
"#;
    let config = Config::from_toml(text).unwrap();
    let (_, errors) = build_pipeline(&config);
    // bad mute hours, empty link list, missing `{}` placeholder, bad pattern
    assert_eq!(errors.len(), 4, "got: {errors:?}");
}

#[test]
fn rejects_unknown_fields() {
    assert!(Config::from_toml("unknown_key = 1").is_err());
}

#[test]
fn day_interval_wraps_across_midnight() {
    let night = DayInterval::from_to(22, 6).unwrap();
    for hour in [22, 23, 0, 3, 5] {
        assert!(night.contains_hour(hour), "hour {hour} should be muted");
    }
    for hour in [6, 12, 21] {
        assert!(!night.contains_hour(hour), "hour {hour} should not be muted");
    }

    let all_day = DayInterval::from_to(3, 3).unwrap();
    for hour in 0..24 {
        assert!(all_day.contains_hour(hour));
    }

    assert!(DayInterval::from_to(24, 3).is_err());
    assert!(!DayInterval::default().contains_hour(12));
    assert!(DayInterval::default().is_empty());
}
