pub mod config;
pub mod dedup;
pub mod filter;
pub mod guard;
pub mod matcher;
pub mod pipeline;
pub mod publishers;
pub mod rotator;
pub mod sources;
pub mod traits;
pub mod types;

pub use config::{build_pipeline, Config};
pub use dedup::{DedupKey, Deduplicator, SyncDeduplicator};
pub use filter::Filter;
pub use guard::Guard;
pub use matcher::{tokenize, Expr, Pattern};
pub use pipeline::Pipeline;
pub use publishers::{HttpPublisher, HttpPublisherParams, LogPublisher};
pub use rotator::{Rotator, RotatorElem};
pub use sources::{FeedSource, FeedSourceParams};
pub use traits::{ItemSink, Publisher, Source};
pub use types::{
    DayInterval, Item, ItemParams, PubInfo, Result, RouterError, SourceInfo,
};
