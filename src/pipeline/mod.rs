//! End-to-end flows over the pipeline stages.
//!
//! ```text
//! browse: fetch groups → trends → save batch → chart → top N → watermark → save → deliver
//! search: fetch groups (top) → keyword filter → images → watermark → save → deliver
//! ```
//!
//! Steps run one after another. Failures of a single group or item are
//! logged and skipped; only a failed batch save ends a flow with an error.

pub mod delivery;

use std::sync::Arc;

use crate::app::Result;
use crate::chart;
use crate::config::Config;
use crate::domain::{Item, MemeSave, Mode, TrendEntry};
use crate::ranking::{filter_by_keywords, parse_keywords, top_by_score};
use crate::source::ContentSource;
use crate::store::Store;
use crate::trends::extract_trends;
use crate::watermark::{WatermarkOutcome, Watermarker};

pub use delivery::{Delivery, Outgoing, Photo};

pub const NOTHING_FOUND: &str = "Nothing found for your request 😢";
pub const NO_IMAGES: &str = "No matching memes found with images";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub browse_groups: Vec<String>,
    pub browse_limit: usize,
    pub search_groups: Vec<String>,
    pub search_limit: usize,
    pub top_n: usize,
    pub trend_top_k: usize,
    pub max_search_images: usize,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            browse_groups: config.sources.browse_groups.clone(),
            browse_limit: config.sources.browse_limit,
            search_groups: config.sources.search_groups.clone(),
            search_limit: config.sources.search_limit,
            top_n: config.selection.top_n,
            trend_top_k: config.selection.trend_top_k,
            max_search_images: config.selection.max_search_images,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseReport {
    pub fetched: usize,
    pub trends: Vec<TrendEntry>,
    pub memes_saved: usize,
    /// Image items delivered by original url because watermarking failed
    pub fallbacks: usize,
    pub texts: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    pub keywords: Vec<String>,
    pub matched: usize,
    pub candidates: usize,
    pub memes_saved: usize,
    pub failures: usize,
}

pub struct Pipeline<S> {
    source: Arc<dyn ContentSource + Send + Sync>,
    watermarker: Arc<Watermarker>,
    store: Arc<S>,
    settings: PipelineSettings,
}

impl<S: Store + Send + Sync> Pipeline<S> {
    pub fn new(
        source: Arc<dyn ContentSource + Send + Sync>,
        watermarker: Arc<Watermarker>,
        store: Arc<S>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            watermarker,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Fetch every browse group in `mode`, record the batch and its trends,
    /// then deliver the trend chart and the top items by score.
    pub async fn browse(&self, mode: Mode, out: &dyn Delivery) -> Result<BrowseReport> {
        send(out, Outgoing::Text(format!("Looking for {mode} posts..."))).await;

        let items = self
            .fetch_groups(&self.settings.browse_groups, mode, self.settings.browse_limit)
            .await;
        let trends = extract_trends(&items, self.settings.trend_top_k);

        self.store.save_batch(&items, &trends)?;

        match chart::render(&trends, self.watermarker.typeface()) {
            Ok(png) => send(out, Outgoing::Chart(png)).await,
            Err(e) => tracing::warn!(error = %e, "Trend chart rendering failed"),
        }

        let mut report = BrowseReport {
            fetched: items.len(),
            trends,
            ..Default::default()
        };

        for item in top_by_score(&items, self.settings.top_n) {
            let caption = item.caption();

            if !item.is_image() {
                report.texts += 1;
                send(out, Outgoing::Text(format!("{caption}\n{}", item.url()))).await;
                continue;
            }

            match self.watermarker.watermark(item.url()).await {
                WatermarkOutcome::Applied(png) => {
                    if self.persist_meme(&item, &png) {
                        report.memes_saved += 1;
                        let photo = Photo::Bytes(png);
                        send(out, Outgoing::Photo { photo, caption }).await;
                    } else {
                        report.failures += 1;
                        send(out, Outgoing::Text(format!("Error processing meme: {}", item.url())))
                            .await;
                    }
                }
                WatermarkOutcome::Failed { reason } => {
                    tracing::debug!(url = item.url(), %reason, "Falling back to original image");
                    report.fallbacks += 1;
                    let photo = Photo::Url(item.url().to_string());
                    send(out, Outgoing::Photo { photo, caption }).await;
                }
            }
        }

        tracing::info!(
            %mode,
            fetched = report.fetched,
            memes = report.memes_saved,
            fallbacks = report.fallbacks,
            texts = report.texts,
            "Browse complete"
        );
        Ok(report)
    }

    /// Find top posts whose titles mention any of the comma-separated
    /// keywords and deliver watermarked copies of the image matches.
    pub async fn search(&self, raw_keywords: &str, out: &dyn Delivery) -> Result<SearchReport> {
        let keywords = parse_keywords(raw_keywords);
        send(
            out,
            Outgoing::Text(format!(
                "Looking for posts by keywords: {}...",
                keywords.join(", ")
            )),
        )
        .await;

        let mut report = SearchReport {
            keywords,
            ..Default::default()
        };

        let matches = if report.keywords.is_empty() {
            Vec::new()
        } else {
            let items = self
                .fetch_groups(&self.settings.search_groups, Mode::Top, self.settings.search_limit)
                .await;
            filter_by_keywords(&items, &report.keywords)
        };
        report.matched = matches.len();

        if matches.is_empty() {
            send(out, Outgoing::Text(NOTHING_FOUND.to_string())).await;
            return Ok(report);
        }

        let candidates: Vec<Item> = matches
            .into_iter()
            .filter(Item::is_image)
            .take(self.settings.max_search_images)
            .collect();
        report.candidates = candidates.len();

        if candidates.is_empty() {
            send(out, Outgoing::Text(NO_IMAGES.to_string())).await;
            return Ok(report);
        }

        for item in candidates {
            let png = match self.watermarker.watermark(item.url()).await {
                WatermarkOutcome::Applied(png) => png,
                WatermarkOutcome::Failed { reason } => {
                    tracing::debug!(url = item.url(), %reason, "Skipping search result");
                    report.failures += 1;
                    send(out, Outgoing::Text(format!("Failed to process meme: {}", item.url())))
                        .await;
                    continue;
                }
            };

            if self.persist_meme(&item, &png) {
                report.memes_saved += 1;
                let photo = Photo::Bytes(png);
                send(out, Outgoing::Photo { photo, caption: item.caption() }).await;
            } else {
                report.failures += 1;
                send(out, Outgoing::Text(format!("Error processing meme: {}", item.url()))).await;
            }
        }

        tracing::info!(
            keywords = ?report.keywords,
            matched = report.matched,
            memes = report.memes_saved,
            failures = report.failures,
            "Search complete"
        );
        Ok(report)
    }

    async fn fetch_groups(&self, groups: &[String], mode: Mode, limit: usize) -> Vec<Item> {
        let mut items = Vec::new();
        for group in groups {
            match self.source.fetch_items(group, mode, limit).await {
                Ok(batch) => items.extend(batch),
                Err(e) => {
                    tracing::warn!(group = %group, %mode, error = %e, "Skipping source group")
                }
            }
        }
        items
    }

    /// Save one meme; a storage error only fails this item.
    fn persist_meme(&self, item: &Item, png: &[u8]) -> bool {
        match self.store.save_meme(item, png) {
            Ok(MemeSave::Saved { .. }) => true,
            Ok(MemeSave::EmptyPayload) => false,
            Err(e) => {
                tracing::warn!(url = item.url(), error = %e, "Meme not saved");
                false
            }
        }
    }
}

async fn send(out: &dyn Delivery, message: Outgoing) {
    if let Err(e) = out.deliver(message).await {
        tracing::warn!(error = %e, "Delivery failed");
    }
}
