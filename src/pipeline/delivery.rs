use async_trait::async_trait;
use bytes::Bytes;

use crate::app::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    /// Watermarked image data
    Bytes(Bytes),
    /// Original image location, used when watermarking failed
    Url(String),
}

/// One message produced by a flow for the conversation that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Chart(Bytes),
    Photo { photo: Photo, caption: String },
    Text(String),
}

/// The consumer of pipeline output (chat front-end, console, test recorder).
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, message: Outgoing) -> Result<()>;
}
