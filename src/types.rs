use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::dedup::DedupKey;
use crate::matcher::tokenize;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("pattern error: {0}")]
    Pattern(String),

    #[error("filter condition error: {0}")]
    Condition(String),

    #[error("duplicate source: {0}")]
    DuplicateSource(String),

    #[error("duplicate publisher: {0}")]
    DuplicatePublisher(String),

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RouterError>;

/// Set of day hours (0..=23) during which a source's polling is suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayInterval {
    hours: u32,
}

impl DayInterval {
    /// Fills hours cyclically starting at `begin`, stopping when the cursor
    /// reaches `end` (exclusive) or wraps back to `begin`. `begin == end`
    /// therefore covers all 24 hours.
    pub fn from_to(begin: u32, end: u32) -> Result<Self> {
        if begin > 23 || end > 23 {
            return Err(RouterError::Config(format!(
                "mute hours must be in 0..=23, got [{begin}, {end}]"
            )));
        }
        let mut hours = 0u32;
        let mut h = begin;
        loop {
            hours |= 1 << h;
            h = (h + 1) % 24;
            if h == begin || h == end {
                break;
            }
        }
        Ok(Self { hours })
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        hour < 24 && self.hours & (1 << hour) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.hours == 0
    }
}

impl fmt::Display for DayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours: Vec<u32> = (0..24).filter(|&h| self.contains_hour(h)).collect();
        write!(f, "{hours:?}")
    }
}

/// Description of a news source (producer).
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique source name, by convention `AgencyName.ChannelName`.
    pub name: String,
    /// Category globs used to prefilter items before they enter the pipeline.
    pub categories: Vec<String>,
    /// Minimum time between two polls of this source.
    pub cooldown: Duration,
    /// Day hours during which polling is suppressed.
    pub mute_interval: DayInterval,
}

impl SourceInfo {
    /// Verifies consistency and applies defaults.
    pub fn check(&mut self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RouterError::Source("source name required".into()));
        }
        if self.cooldown.is_zero() {
            self.cooldown = Duration::from_secs(15 * 60);
        }
        Ok(())
    }
}

/// Description of a publisher (notifier).
#[derive(Debug, Clone)]
pub struct PubInfo {
    pub name: String,
}

/// Raw item fields as received from a feed.
#[derive(Debug, Clone)]
pub struct ItemParams {
    pub src: Arc<SourceInfo>,
    pub title: String,
    pub link: String,
    pub categories: Vec<String>,
    pub published: Option<DateTime<Utc>>,
}

/// A news item produced by a source, with the tokenized title and the
/// dedup key derived from it.
#[derive(Debug, Clone)]
pub struct Item {
    pub src: Arc<SourceInfo>,
    pub title: String,
    pub link: String,
    pub categories: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    words: Vec<String>,
    key: DedupKey,
}

impl Item {
    pub fn new(params: ItemParams) -> Result<Self> {
        if params.title.trim().is_empty() {
            return Err(RouterError::Source("item title required".into()));
        }
        let words = tokenize(&params.title);
        let key = DedupKey::of_words(&words);
        Ok(Self {
            src: params.src,
            title: params.title,
            link: params.link,
            categories: params.categories,
            published: params.published,
            words,
            key,
        })
    }

    /// Tokenized title words, in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn key(&self) -> DedupKey {
        self.key
    }
}
