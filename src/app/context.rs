use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{MemebotError, Result};
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::source::{ContentSource, RedditSource};
use crate::store::sqlite::SqliteStore;
use crate::typeface::FontResolver;
use crate::watermark::{WatermarkStyle, Watermarker};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub source: Arc<dyn ContentSource + Send + Sync>,
    pub watermarker: Arc<Watermarker>,
}

impl AppContext {
    /// `db_path` overrides the configured database location.
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path.or_else(|| config.database.clone()) {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!(path = %db_path.display(), "Opened database");
        Ok(Self::with_store(config, store))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::with_store(config, store))
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Self {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::with_config(&config.http));
        let source: Arc<dyn ContentSource + Send + Sync> = Arc::new(RedditSource::with_base_url(
            fetcher.clone(),
            config.sources.base_url.clone(),
        ));

        let typeface = FontResolver::new(
            config.watermark.fonts.clone(),
            config.watermark.font_dirs.clone(),
        )
        .resolve();
        tracing::debug!(typeface = typeface.name(), "Resolved watermark font");

        let watermarker = Arc::new(Watermarker::new(
            fetcher,
            typeface,
            WatermarkStyle::from(&config.watermark),
        ));

        Self {
            config,
            store,
            source,
            watermarker,
        }
    }

    pub fn pipeline(&self) -> Pipeline<SqliteStore> {
        Pipeline::new(
            self.source.clone(),
            self.watermarker.clone(),
            self.store.clone(),
            PipelineSettings::from(&self.config),
        )
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| MemebotError::Config("Could not find data directory".into()))?;
        let memebot_dir = data_dir.join("memebot");
        std::fs::create_dir_all(&memebot_dir)?;
        Ok(memebot_dir.join("memebot.db"))
    }
}
