use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::app::{MemebotError, Result};
use crate::domain::{Item, Mode};
use crate::fetcher::Fetcher;
use crate::source::ContentSource;

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

/// The subset of a Reddit post the pipeline consumes.
#[derive(Debug, Deserialize)]
struct RawPost {
    title: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    created_utc: f64,
}

impl RawPost {
    fn into_item(self, group: &str) -> Item {
        Item::from_epoch(self.title, self.score, self.url, group, self.created_utc)
    }
}

pub struct RedditSource {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    base_url: String,
}

impl RedditSource {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn listing_url(&self, group: &str, mode: Mode, limit: usize) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/r/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            group,
            mode
        ))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.to_string());
            query.append_pair("raw_json", "1");
            if mode == Mode::Top {
                query.append_pair("t", "all");
            }
        }

        Ok(url)
    }

    fn parse_listing(group: &str, body: &[u8], limit: usize) -> Result<Vec<Item>> {
        let listing: Listing = serde_json::from_slice(body)
            .map_err(|e| MemebotError::Source(format!("r/{group}: malformed listing: {e}")))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .take(limit)
            .map(|child| child.data.into_item(group))
            .collect())
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    async fn fetch_items(&self, group: &str, mode: Mode, limit: usize) -> Result<Vec<Item>> {
        let url = self.listing_url(group, mode, limit)?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        let items = Self::parse_listing(group, &body, limit)?;

        tracing::debug!(group, %mode, count = items.len(), "Fetched listing");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpFetcher;

    const LISTING: &str = r#"{
      "kind": "Listing",
      "data": {
        "after": "t3_xyz",
        "children": [
          {"kind": "t3", "data": {"title": "When the code compiles", "score": 1520,
            "url": "https://i.redd.it/abc123.jpg", "created_utc": 1700000000.0, "subreddit": "memes"}},
          {"kind": "t3", "data": {"title": "Discussion thread", "score": 12,
            "url": "https://www.reddit.com/r/memes/comments/xyz/discussion/", "created_utc": 1700000100.0}}
        ]
      }
    }"#;

    fn source() -> RedditSource {
        RedditSource::new(Arc::new(HttpFetcher::new()))
    }

    #[test]
    fn test_listing_url() {
        let url = source().listing_url("memes", Mode::Hot, 10).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/memes/hot.json?limit=10&raw_json=1"
        );
    }

    #[test]
    fn test_listing_url_top_uses_all_time() {
        let url = source().listing_url("dankmemes", Mode::Top, 50).unwrap();
        assert!(url.as_str().ends_with("/r/dankmemes/top.json?limit=50&raw_json=1&t=all"));
    }

    #[test]
    fn test_parse_listing() {
        let items = RedditSource::parse_listing("memes", LISTING.as_bytes(), 10).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "When the code compiles");
        assert_eq!(items[0].score, 1520);
        assert_eq!(items[0].source_group, "memes");
        assert!(items[0].is_image());
        assert!(!items[1].is_image());
        assert_eq!(items[1].created_at.timestamp(), 1_700_000_100);
    }

    #[test]
    fn test_parse_listing_respects_limit() {
        let items = RedditSource::parse_listing("memes", LISTING.as_bytes(), 1).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_parse_listing_malformed() {
        let err = RedditSource::parse_listing("memes", b"<html>", 10).unwrap_err();
        assert!(matches!(err, MemebotError::Source(_)));
    }
}
