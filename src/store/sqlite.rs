use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use sha2::{Digest, Sha256};

use crate::app::{MemebotError, Result};
use crate::domain::{
    BatchSummary, Item, MemeSave, MemeSummary, PersistedMeme, PersistedPost, StoreCounts,
    StoredTrend, TrendEntry,
};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| MemebotError::Other(format!("Migration failed: {e}")))?;

        Ok(())
    }

    /// Lock the connection for the duration of one call.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MemebotError::Other(format!("Store lock poisoned: {e}")))
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn datetime_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        Ok(row
            .get::<_, String>(idx)
            .ok()
            .and_then(|s| Self::parse_datetime(&s))
            .unwrap_or_default())
    }

    fn insert_batch(
        conn: &mut Connection,
        items: &[Item],
        trends: &[TrendEntry],
    ) -> Result<BatchSummary> {
        let recorded_at = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO posts (title, score, url, source_group, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.title,
                    item.score,
                    item.url(),
                    item.source_group,
                    item.created_at.to_rfc3339()
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO trends (term, count, recorded_at) VALUES (?1, ?2, ?3)",
            )?;
            for trend in trends {
                stmt.execute(params![trend.term, trend.count as i64, recorded_at])?;
            }
        }

        tx.commit()?;

        Ok(BatchSummary {
            posts: items.len(),
            trends: trends.len(),
        })
    }

    fn insert_meme(conn: &mut Connection, item: &Item, image: &[u8]) -> Result<i64> {
        let checksum = hex::encode(Sha256::digest(image));
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO memes (title, score, source_group, original_url, image, checksum, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.title,
                item.score,
                item.source_group,
                item.url(),
                image,
                checksum,
                Utc::now().to_rfc3339()
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(id)
    }
}

impl Store for SqliteStore {
    fn save_batch(&self, items: &[Item], trends: &[TrendEntry]) -> Result<BatchSummary> {
        let mut conn = self.conn()?;

        match Self::insert_batch(&mut conn, items, trends) {
            Ok(summary) => {
                tracing::info!(
                    posts = summary.posts,
                    trends = summary.trends,
                    "Saved batch"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "Batch save failed, rolled back");
                Err(e)
            }
        }
    }

    fn save_meme(&self, item: &Item, image: &[u8]) -> Result<MemeSave> {
        if image.is_empty() {
            tracing::warn!(url = item.url(), "Refusing to save meme with empty image");
            return Ok(MemeSave::EmptyPayload);
        }

        let mut conn = self.conn()?;

        match Self::insert_meme(&mut conn, item, image) {
            Ok(id) => {
                tracing::info!(id, url = item.url(), size = image.len(), "Saved meme");
                Ok(MemeSave::Saved { id })
            }
            Err(e) => {
                tracing::error!(error = %e, url = item.url(), "Meme save failed, rolled back");
                Err(e)
            }
        }
    }

    fn recent_posts(&self, limit: usize) -> Result<Vec<PersistedPost>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, score, url, source_group, created_at
             FROM posts ORDER BY id DESC LIMIT ?1",
        )?;

        let posts = stmt
            .query_map(params![limit as i64], |row| {
                Ok(PersistedPost {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    score: row.get(2)?,
                    url: row.get(3)?,
                    source_group: row.get(4)?,
                    created_at: Self::datetime_column(row, 5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    fn recent_trends(&self, limit: usize) -> Result<Vec<StoredTrend>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, term, count, recorded_at
             FROM trends ORDER BY id DESC LIMIT ?1",
        )?;

        let trends = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StoredTrend {
                    id: row.get(0)?,
                    term: row.get(1)?,
                    count: row.get(2)?,
                    recorded_at: Self::datetime_column(row, 3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(trends)
    }

    fn list_memes(&self, limit: usize) -> Result<Vec<MemeSummary>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, score, source_group, original_url, length(image), checksum, created_at
             FROM memes ORDER BY id DESC LIMIT ?1",
        )?;

        let memes = stmt
            .query_map(params![limit as i64], |row| {
                Ok(MemeSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    score: row.get(2)?,
                    source_group: row.get(3)?,
                    original_url: row.get(4)?,
                    size: row.get(5)?,
                    checksum: row.get(6)?,
                    created_at: Self::datetime_column(row, 7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(memes)
    }

    fn get_meme(&self, id: i64) -> Result<Option<PersistedMeme>> {
        let conn = self.conn()?;

        let meme = conn
            .query_row(
                "SELECT id, title, score, source_group, original_url, image, checksum, created_at
                 FROM memes WHERE id = ?1",
                params![id],
                |row| {
                    Ok(PersistedMeme {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        score: row.get(2)?,
                        source_group: row.get(3)?,
                        original_url: row.get(4)?,
                        image: row.get(5)?,
                        checksum: row.get(6)?,
                        created_at: Self::datetime_column(row, 7)?,
                    })
                },
            )
            .optional()?;

        Ok(meme)
    }

    fn counts(&self) -> Result<StoreCounts> {
        let conn = self.conn()?;

        let count = |table: &str| -> rusqlite::Result<i64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
        };

        Ok(StoreCounts {
            posts: count("posts")?,
            trends: count("trends")?,
            memes: count("memes")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, score: i64, url: &str) -> Item {
        Item::new(title, score, url, "memes", Utc::now())
    }

    fn sample_items() -> Vec<Item> {
        vec![
            item("first post", 10, "https://i.redd.it/one.png"),
            item("second post", 20, "https://www.reddit.com/r/memes/comments/2"),
            item("third post", 30, "https://i.redd.it/three.jpg"),
        ]
    }

    fn sample_trends() -> Vec<TrendEntry> {
        vec![TrendEntry::new("post", 3), TrendEntry::new("first", 1)]
    }

    #[test]
    fn test_save_batch_persists_posts_and_trends() {
        let store = SqliteStore::in_memory().unwrap();
        let summary = store.save_batch(&sample_items(), &sample_trends()).unwrap();

        assert_eq!(summary, BatchSummary { posts: 3, trends: 2 });
        let counts = store.counts().unwrap();
        assert_eq!(counts.posts, 3);
        assert_eq!(counts.trends, 2);
        assert_eq!(counts.memes, 0);
    }

    #[test]
    fn test_save_batch_rolls_back_when_trend_insert_fails() {
        let store = SqliteStore::in_memory().unwrap();
        // empty term violates the trends CHECK constraint after all posts are inserted
        let trends = vec![TrendEntry::new("post", 3), TrendEntry::new("", 1)];

        let result = store.save_batch(&sample_items(), &trends);

        assert!(matches!(result, Err(MemebotError::Database(_))));
        let counts = store.counts().unwrap();
        assert_eq!(counts.posts, 0);
        assert_eq!(counts.trends, 0);
    }

    #[test]
    fn test_save_batch_rolls_back_when_post_insert_fails_midway() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_second_post BEFORE INSERT ON posts
                 WHEN NEW.title = 'second post'
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        let result = store.save_batch(&sample_items(), &sample_trends());

        assert!(result.is_err());
        let counts = store.counts().unwrap();
        assert_eq!(counts.posts, 0);
        assert_eq!(counts.trends, 0);
    }

    #[test]
    fn test_store_usable_after_failed_batch() {
        let store = SqliteStore::in_memory().unwrap();
        let bad = vec![TrendEntry::new("", 1)];
        assert!(store.save_batch(&sample_items(), &bad).is_err());

        store.save_batch(&sample_items(), &sample_trends()).unwrap();
        assert_eq!(store.counts().unwrap().posts, 3);
    }

    #[test]
    fn test_save_empty_batch() {
        let store = SqliteStore::in_memory().unwrap();
        let summary = store.save_batch(&[], &[]).unwrap();
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_save_meme_empty_payload_writes_nothing() {
        let store = SqliteStore::in_memory().unwrap();
        let outcome = store
            .save_meme(&item("meme", 5, "https://i.redd.it/a.png"), b"")
            .unwrap();

        assert_eq!(outcome, MemeSave::EmptyPayload);
        assert!(!outcome.is_saved());
        assert_eq!(store.counts().unwrap().memes, 0);
    }

    #[test]
    fn test_save_and_get_meme() {
        let store = SqliteStore::in_memory().unwrap();
        let source = item("funny meme", 99, "https://i.redd.it/a.png");
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];

        let id = match store.save_meme(&source, &bytes).unwrap() {
            MemeSave::Saved { id } => id,
            other => panic!("unexpected outcome: {other:?}"),
        };

        let meme = store.get_meme(id).unwrap().unwrap();
        assert_eq!(meme.title, "funny meme");
        assert_eq!(meme.score, 99);
        assert_eq!(meme.original_url, "https://i.redd.it/a.png");
        assert_eq!(meme.image, bytes);
        assert_eq!(meme.checksum, hex::encode(Sha256::digest(&bytes)));
    }

    #[test]
    fn test_save_meme_storage_failure_is_raised() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute_batch("DROP TABLE memes")
            .unwrap();

        let result = store.save_meme(&item("m", 1, "https://i.redd.it/a.png"), b"data");
        assert!(matches!(result, Err(MemebotError::Database(_))));
    }

    #[test]
    fn test_list_memes_reports_size() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .save_meme(&item("a", 1, "https://i.redd.it/a.png"), b"12345")
            .unwrap();
        store
            .save_meme(&item("b", 2, "https://i.redd.it/b.png"), b"123")
            .unwrap();

        let memes = store.list_memes(10).unwrap();
        assert_eq!(memes.len(), 2);
        assert_eq!(memes[0].title, "b");
        assert_eq!(memes[0].size, 3);
        assert_eq!(memes[1].size, 5);
    }

    #[test]
    fn test_get_meme_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_meme(42).unwrap().is_none());
    }

    #[test]
    fn test_recent_posts_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_batch(&sample_items(), &[]).unwrap();

        let posts = store.recent_posts(2).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "third post");
        assert_eq!(posts[1].title, "second post");
        assert_eq!(posts[0].url, "https://i.redd.it/three.jpg");
    }

    #[test]
    fn test_recent_trends() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_batch(&[], &sample_trends()).unwrap();

        let trends = store.recent_trends(10).unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].term, "first");
        assert_eq!(trends[1].term, "post");
        assert_eq!(trends[1].count, 3);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memebot.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.save_batch(&sample_items(), &sample_trends()).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        let counts = store.counts().unwrap();
        assert_eq!(counts.posts, 3);
        assert_eq!(counts.trends, 2);
    }
}
