use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use tracing::{debug, warn};

use crate::traits::{ItemSink, Source};
use crate::types::{Item, ItemParams, Result, RouterError, SourceInfo};

/// Base pause between successive links of a multi-link source; a random
/// jitter of the same magnitude is added on top.
const LINK_PAUSE: Duration = Duration::from_secs(20);

pub struct FeedSourceParams {
    pub info: SourceInfo,
    pub links: Vec<String>,
    /// Optional shared HTTP client; a default one is built when absent.
    pub client: Option<Client>,
}

/// RSS/Atom polling source. Each poll fetches the configured feed URLs in a
/// shuffled order and feeds every parsed entry to the sink.
pub struct FeedSource {
    info: Arc<SourceInfo>,
    links: Vec<String>,
    client: Client,
}

impl FeedSource {
    pub fn new(params: FeedSourceParams) -> Result<Self> {
        let FeedSourceParams {
            mut info,
            links,
            client,
        } = params;
        if links.is_empty() {
            return Err(RouterError::Source(format!(
                "feed source '{}': no links",
                info.name
            )));
        }
        for link in &links {
            url::Url::parse(link)?;
        }
        info.check()?;
        let client = match client {
            Some(client) => client,
            None => default_client(),
        };
        debug!(
            "Created feed source '{}' ({} links, cooldown {:?}, mute hours {})",
            info.name,
            links.len(),
            info.cooldown,
            info.mute_interval
        );
        Ok(Self {
            info: Arc::new(info),
            links,
            client,
        })
    }

    fn shuffled_links(&self) -> Vec<&str> {
        use rand::seq::SliceRandom;
        let mut links: Vec<&str> = self.links.iter().map(String::as_str).collect();
        links.shuffle(&mut rand::rng());
        links
    }

    async fn receive_one(&self, link: &str, sink: &ItemSink) {
        let feed = match self.fetch_and_parse(link).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Feed source '{}': {link}: {e}", self.info.name);
                return;
            }
        };
        debug!(
            "Feed source '{}': {link}: {} entries",
            self.info.name,
            feed.entries.len()
        );
        for entry in feed.entries {
            match entry_to_item(entry, &self.info) {
                Ok(item) => sink.accept(item).await,
                Err(e) => warn!("Feed source '{}': skipping entry: {e}", self.info.name),
            }
        }
    }

    async fn fetch_and_parse(&self, link: &str) -> Result<feed_rs::model::Feed> {
        let response = self.client.get(link).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        feed_rs::parser::parse(body.as_ref())
            .map_err(|e| RouterError::Source(format!("feed parse failed: {e}")))
    }
}

fn default_client() -> Client {
    Client::builder()
        .user_agent(concat!("news-router/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
        .expect("failed to build HTTP client")
}

/// Converts one parsed feed entry into an item. Entries without a title are
/// rejected here and never enter the pipeline.
pub fn entry_to_item(entry: feed_rs::model::Entry, src: &Arc<SourceInfo>) -> Result<Item> {
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let categories = entry.categories.into_iter().map(|c| c.term).collect();
    let published = entry.published.map(|dt| dt.with_timezone(&Utc));
    Item::new(ItemParams {
        src: Arc::clone(src),
        title,
        link,
        categories,
        published,
    })
}

#[async_trait]
impl Source for FeedSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    async fn receive(&self, sink: &ItemSink) -> Result<()> {
        let links = self.shuffled_links();
        let multi = links.len() > 1;
        for (i, link) in links.into_iter().enumerate() {
            if multi && i > 0 {
                let jitter = rand::rng().random_range(0..LINK_PAUSE.as_millis() as u64);
                tokio::time::sleep(LINK_PAUSE + Duration::from_millis(jitter)).await;
            }
            self.receive_one(link, sink).await;
        }
        Ok(())
    }
}
