pub mod http_fetcher;

use async_trait::async_trait;
use bytes::Bytes;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Retrieves the raw body behind a URL. Non-success statuses are errors.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}
