use chrono::{DateTime, Utc};
use url::Url;

/// URL path suffixes that mark an item as directly displayable image content.
pub const IMAGE_SUFFIXES: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// One post from a content source, normalized into the shape the pipeline uses.
///
/// `url` and `is_image` are private: `is_image` is derived from `url` on
/// construction and whenever the url is replaced through [`Item::with_url`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub score: i64,
    url: String,
    pub source_group: String,
    pub created_at: DateTime<Utc>,
    is_image: bool,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        score: i64,
        url: impl Into<String>,
        source_group: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let url = url.into();
        let is_image = is_image_url(&url);
        Self {
            title: title.into(),
            score,
            url,
            source_group: source_group.into(),
            created_at,
            is_image,
        }
    }

    /// Build an item from a source-supplied epoch timestamp (seconds, possibly fractional).
    pub fn from_epoch(
        title: impl Into<String>,
        score: i64,
        url: impl Into<String>,
        source_group: impl Into<String>,
        created_utc: f64,
    ) -> Self {
        let created_at =
            DateTime::from_timestamp(created_utc.trunc() as i64, 0).unwrap_or_default();
        Self::new(title, score, url, source_group, created_at)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_image(&self) -> bool {
        self.is_image
    }

    /// Returns a copy pointing at `url`, with the image flag recomputed.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self::new(
            self.title.clone(),
            self.score,
            url,
            self.source_group.clone(),
            self.created_at,
        )
    }

    /// Caption used when delivering this item to a conversation.
    pub fn caption(&self) -> String {
        format!(
            "{}\nUpvotes: {}\nSubreddit: {}",
            self.title, self.score, self.source_group
        )
    }
}

/// Case-insensitive suffix test on the URL path; query and fragment are ignored.
pub fn is_image_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase(),
    };
    IMAGE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> Item {
        Item::new("title", 1, url, "memes", Utc::now())
    }

    #[test]
    fn test_image_suffixes_detected() {
        assert!(item("https://i.redd.it/abc.jpg").is_image());
        assert!(item("https://i.redd.it/abc.JPEG").is_image());
        assert!(item("https://i.imgur.com/abc.png").is_image());
    }

    #[test]
    fn test_non_image_urls() {
        assert!(!item("https://www.reddit.com/r/memes/comments/xyz").is_image());
        assert!(!item("https://v.redd.it/abc").is_image());
        assert!(!item("https://example.com/file.gif").is_image());
    }

    #[test]
    fn test_query_string_ignored() {
        assert!(item("https://preview.redd.it/abc.png?width=640&auto=webp").is_image());
        assert!(!item("https://example.com/page?img=cat.png").is_image());
    }

    #[test]
    fn test_with_url_recomputes_flag() {
        let original = item("https://i.redd.it/abc.jpg");
        let moved = original.with_url("https://www.reddit.com/r/memes");
        assert!(original.is_image());
        assert!(!moved.is_image());
        assert_eq!(moved.title, original.title);
    }

    #[test]
    fn test_from_epoch() {
        let item = Item::from_epoch("t", 3, "https://x.test/a.png", "memes", 1_700_000_000.75);
        assert_eq!(item.created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_caption_format() {
        let item = Item::new("Funny cat", 420, "https://x.test", "memes", Utc::now());
        assert_eq!(item.caption(), "Funny cat\nUpvotes: 420\nSubreddit: memes");
    }
}
