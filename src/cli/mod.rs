pub mod commands;
pub mod delivery;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use delivery::ConsoleDelivery;

#[derive(Parser)]
#[command(name = "memebot")]
#[command(about = "Fetch memes, chart trending words, watermark the best", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/memebot/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch posts, chart the trends and deliver the top posts
    Browse {
        /// Listing order: hot, new, top or rising (unknown values mean hot)
        #[arg(short, long, default_value = "hot")]
        mode: String,

        /// Directory for charts and watermarked images
        #[arg(short, long, default_value = "memebot-out")]
        out: PathBuf,
    },
    /// Search top posts by comma-separated keywords
    Search {
        /// Keywords, e.g. "cat, dog"
        keywords: String,

        /// Directory for watermarked images
        #[arg(short, long, default_value = "memebot-out")]
        out: PathBuf,
    },
    /// Interactive menu driven session on stdin
    Chat {
        /// Directory for charts and watermarked images
        #[arg(short, long, default_value = "memebot-out")]
        out: PathBuf,
    },
    /// Show recently recorded trends
    Trends {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recently saved posts
    Posts {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Saved watermarked memes
    Memes {
        #[command(subcommand)]
        action: MemeAction,
    },
    /// Show row counts
    Stats,
}

#[derive(Subcommand)]
pub enum MemeAction {
    /// List saved memes
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a saved meme's image to a file
    Export {
        /// Meme id, as shown by `memes list`
        id: i64,
        /// Destination PNG file
        path: PathBuf,
    },
}
