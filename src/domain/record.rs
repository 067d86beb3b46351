use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PersistedPost {
    pub id: i64,
    pub title: String,
    pub score: i64,
    pub url: String,
    pub source_group: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredTrend {
    pub id: i64,
    pub term: String,
    pub count: i64,
    pub recorded_at: DateTime<Utc>,
}

/// A watermarked image together with the post it came from.
#[derive(Debug, Clone)]
pub struct PersistedMeme {
    pub id: i64,
    pub title: String,
    pub score: i64,
    pub source_group: String,
    pub original_url: String,
    pub image: Vec<u8>,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

/// Meme metadata without the image payload, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct MemeSummary {
    pub id: i64,
    pub title: String,
    pub score: i64,
    pub source_group: String,
    pub original_url: String,
    pub size: i64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub posts: usize,
    pub trends: usize,
}

/// Outcome of persisting one meme. An empty payload is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemeSave {
    Saved { id: i64 },
    EmptyPayload,
}

impl MemeSave {
    pub fn is_saved(&self) -> bool {
        matches!(self, MemeSave::Saved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub posts: i64,
    pub trends: i64,
    pub memes: i64,
}
