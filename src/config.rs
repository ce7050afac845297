use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::dedup::Deduplicator;
use crate::filter::Filter;
use crate::pipeline::{Pipeline, DEFAULT_CHAN_SIZE, DEFAULT_DEDUP_SIZE};
use crate::publishers::{HttpPublisher, HttpPublisherParams};
use crate::sources::{FeedSource, FeedSourceParams};
use crate::types::{DayInterval, PubInfo, Result, RouterError, SourceInfo};

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rotator tick in seconds.
    pub tick: Option<u64>,
    /// Per-publisher queue capacity.
    pub chan_size: Option<usize>,
    /// Dedup cache capacity.
    pub dedup_size: Option<usize>,
    /// Global mute interval `[begin, end]` applied to every source.
    pub mute_hours: Option<[u32; 2]>,
    #[serde(default)]
    pub filters: Vec<FilterConf>,
    #[serde(default, rename = "src")]
    pub sources: HashMap<String, SrcConf>,
    #[serde(default, rename = "pub")]
    pub pubs: HashMap<String, PubConf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConf {
    pub cond: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub pubs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SrcConf {
    pub links: Vec<String>,
    /// Poll cooldown in seconds; zero falls back to the source default.
    #[serde(default)]
    pub cooldown: u64,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PubConf {
    /// GET URL template with a `{}` placeholder for the message.
    pub get_url: String,
    /// Pause between deliveries in seconds.
    #[serde(default)]
    pub send_pause: u64,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Builds a pipeline from the configuration, collecting every per-entity
/// error instead of stopping at the first one. Callers are expected to treat
/// a non-empty error list as fatal and not start the pipeline.
pub fn build_pipeline(config: &Config) -> (Pipeline, Vec<RouterError>) {
    let mut errors = Vec::new();
    let mut pipeline = Pipeline::new(
        config.chan_size.unwrap_or(DEFAULT_CHAN_SIZE),
        Deduplicator::new(config.dedup_size.unwrap_or(DEFAULT_DEDUP_SIZE)),
    );
    if let Some(tick) = config.tick {
        pipeline = pipeline.with_tick(Duration::from_secs(tick));
    }

    let mute = match config.mute_hours {
        Some([begin, end]) => match DayInterval::from_to(begin, end) {
            Ok(interval) => interval,
            Err(e) => {
                errors.push(e);
                DayInterval::default()
            }
        },
        None => DayInterval::default(),
    };

    for (name, conf) in &config.pubs {
        match conf.to_publisher(name) {
            Ok(publisher) => {
                if let Err(e) = pipeline.add_publisher(Box::new(publisher)) {
                    errors.push(e);
                }
            }
            Err(e) => errors.push(e),
        }
    }
    for (name, conf) in &config.sources {
        match conf.to_source(name, mute) {
            Ok(source) => {
                if let Err(e) = pipeline.add_source(Arc::new(source)) {
                    errors.push(e);
                }
            }
            Err(e) => errors.push(e),
        }
    }
    for conf in &config.filters {
        let filter = Filter {
            cond: conf.cond.clone(),
            sources: conf.sources.clone(),
            pubs: conf.pubs.clone(),
        };
        if let Err(e) = pipeline.add_filter(filter) {
            errors.push(e);
        }
    }
    (pipeline, errors)
}

impl SrcConf {
    fn to_source(&self, name: &str, mute: DayInterval) -> Result<FeedSource> {
        FeedSource::new(FeedSourceParams {
            info: SourceInfo {
                name: name.to_string(),
                categories: self.categories.clone(),
                cooldown: Duration::from_secs(self.cooldown),
                mute_interval: mute,
            },
            links: self.links.clone(),
            client: None,
        })
    }
}

impl PubConf {
    fn to_publisher(&self, name: &str) -> Result<HttpPublisher> {
        HttpPublisher::new(HttpPublisherParams {
            info: PubInfo {
                name: name.to_string(),
            },
            get_url: self.get_url.clone(),
            pause: Duration::from_secs(self.send_pause),
        })
    }
}
