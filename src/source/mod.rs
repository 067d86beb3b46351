//! Content sources: where items come from.
//!
//! - [`ContentSource`]: async trait producing [`Item`]s for a source group
//! - [`RedditSource`]: subreddit listings via the public JSON endpoints

pub mod reddit;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Item, Mode};

pub use reddit::RedditSource;

#[async_trait]
pub trait ContentSource {
    /// Fetch up to `limit` items from `group` in the given listing order.
    async fn fetch_items(&self, group: &str, mode: Mode, limit: usize) -> Result<Vec<Item>>;
}
