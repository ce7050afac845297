mod http;
mod log;

pub use http::{format_item, HttpPublisher, HttpPublisherParams};
pub use log::LogPublisher;
