mod feed;

pub use feed::{entry_to_item, FeedSource, FeedSourceParams};
