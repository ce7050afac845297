use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::warn;

use crate::traits::Publisher;
use crate::types::{Item, PubInfo, Result, RouterError};

pub struct HttpPublisherParams {
    pub info: PubInfo,
    /// GET URL template; `{}` is replaced with the percent-encoded message.
    pub get_url: String,
    /// Pause between consecutive deliveries.
    pub pause: Duration,
}

/// Publisher that delivers each item as an HTTP GET notification, one
/// request per item. Delivery failures are logged and never stop the loop.
pub struct HttpPublisher {
    params: HttpPublisherParams,
    client: Client,
}

impl HttpPublisher {
    pub fn new(params: HttpPublisherParams) -> Result<Self> {
        if !params.get_url.contains("{}") {
            return Err(RouterError::Config(format!(
                "publisher '{}': get_url must contain a `{{}}` placeholder",
                params.info.name
            )));
        }
        url::Url::parse(&params.get_url.replace("{}", ""))?;
        Ok(Self {
            params,
            client: Client::new(),
        })
    }

    fn render_url(&self, item: &Item) -> String {
        let msg = format_item(item);
        let encoded: String = url::form_urlencoded::byte_serialize(msg.as_bytes()).collect();
        self.params.get_url.replace("{}", &encoded)
    }

    async fn deliver(&self, item: &Item) -> Result<()> {
        let link = self.render_url(item);
        let response = self.client.get(&link).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::Publish(format!("bad http status: {status}")));
        }
        Ok(())
    }
}

/// Default notification text for an item.
pub fn format_item(item: &Item) -> String {
    match item.published {
        Some(at) => format!("{} {} ({})", item.title, item.link, at.format("%d.%m %H:%M")),
        None => format!("{} {}", item.title, item.link),
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    fn info(&self) -> &PubInfo {
        &self.params.info
    }

    async fn publish(&self, mut rx: mpsc::Receiver<Arc<Item>>) {
        while let Some(item) = rx.recv().await {
            if let Err(e) = self.deliver(&item).await {
                warn!(
                    "Publisher '{}' failed to deliver '{}': {e}",
                    self.params.info.name, item.title
                );
            }
            if !self.params.pause.is_zero() {
                tokio::time::sleep(self.params.pause).await;
            }
        }
    }
}
