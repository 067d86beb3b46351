//! # Memebot
//!
//! Pulls meme posts from community listings, tracks which words are trending,
//! and delivers the best posts with a watermark stamped on them.
//!
//! ## Architecture
//!
//! ```text
//! Source → Normalizer → Trends → Ranking → Watermark → Store → Delivery
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Browse hot posts, writing the chart and memes to ./memebot-out
//! memebot browse --mode hot
//!
//! # Search top posts by keywords
//! memebot search "cat, dog"
//!
//! # Menu driven session
//! memebot chat
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher, content source and watermarker.
pub mod app;

/// Trend bar chart rendering.
pub mod chart;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/memebot/config.toml`.
pub mod config;

/// Menu state per conversation.
pub mod conversation;

/// Core domain models.
///
/// - [`Item`](domain::Item): a fetched post
/// - [`Mode`](domain::Mode): listing order
/// - [`TrendEntry`](domain::TrendEntry): a term and its frequency
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait returning response bodies
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Title normalization into comparable tokens.
pub mod normalizer;

/// Browse and search flows.
pub mod pipeline;

/// Score ordering and keyword filtering.
pub mod ranking;

/// Content sources.
///
/// - [`ContentSource`](source::ContentSource): listing provider trait
/// - [`RedditSource`](source::RedditSource): JSON listing client
pub mod source;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Term frequency over normalized titles.
pub mod trends;

/// Font resolution and text drawing.
pub mod typeface;

/// Watermark compositing.
pub mod watermark;
