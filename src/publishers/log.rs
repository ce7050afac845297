use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::traits::Publisher;
use crate::types::{Item, PubInfo};

/// Publisher that only logs matched items.
pub struct LogPublisher {
    info: PubInfo,
}

impl LogPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: PubInfo { name: name.into() },
        }
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    fn info(&self) -> &PubInfo {
        &self.info
    }

    async fn publish(&self, mut rx: mpsc::Receiver<Arc<Item>>) {
        while let Some(item) = rx.recv().await {
            info!(
                "[{}] {} {} (src {})",
                self.info.name, item.title, item.link, item.src.name
            );
        }
    }
}
