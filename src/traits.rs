use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::filter::match_any_glob_any;
use crate::types::{Item, PubInfo, Result, SourceInfo};

/// A pollable news source. `receive` is invoked by the scheduler when the
/// source is elected for a poll and is never called concurrently with
/// itself; every discovered item goes to the sink.
#[async_trait]
pub trait Source: Send + Sync {
    fn info(&self) -> &SourceInfo;

    async fn receive(&self, sink: &ItemSink) -> Result<()>;
}

/// A delivery channel for matched items. `publish` loops, consuming items
/// until the queue is closed, then returns.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn info(&self) -> &PubInfo;

    async fn publish(&self, rx: mpsc::Receiver<Arc<Item>>);
}

/// The callback surface a source feeds discovered items into. Applies the
/// source's category prefilter before handing items to the pipeline.
#[derive(Clone)]
pub struct ItemSink {
    tx: mpsc::Sender<Arc<Item>>,
    categories: Vec<String>,
}

impl ItemSink {
    pub(crate) fn new(tx: mpsc::Sender<Arc<Item>>, categories: Vec<String>) -> Self {
        Self { tx, categories }
    }

    pub async fn accept(&self, item: Item) {
        if !match_any_glob_any(&item.categories, &self.categories) {
            debug!("Category prefilter dropped '{}'", item.title);
            return;
        }
        if self.tx.send(Arc::new(item)).await.is_err() {
            debug!("Pipeline closed, item dropped");
        }
    }
}
