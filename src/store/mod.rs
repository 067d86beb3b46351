pub mod sqlite;

use crate::app::Result;
use crate::domain::{
    BatchSummary, Item, MemeSave, MemeSummary, PersistedMeme, PersistedPost, StoreCounts,
    StoredTrend, TrendEntry,
};

pub use sqlite::SqliteStore;

/// Durable storage for fetched posts, trend snapshots and watermarked memes.
///
/// Each write is its own transaction: it either commits completely or
/// leaves nothing behind and returns the error.
pub trait Store {
    // Writes
    fn save_batch(&self, items: &[Item], trends: &[TrendEntry]) -> Result<BatchSummary>;
    fn save_meme(&self, item: &Item, image: &[u8]) -> Result<MemeSave>;

    // Reads
    fn recent_posts(&self, limit: usize) -> Result<Vec<PersistedPost>>;
    fn recent_trends(&self, limit: usize) -> Result<Vec<StoredTrend>>;
    fn list_memes(&self, limit: usize) -> Result<Vec<MemeSummary>>;
    fn get_meme(&self, id: i64) -> Result<Option<PersistedMeme>>;
    fn counts(&self) -> Result<StoreCounts>;
}
