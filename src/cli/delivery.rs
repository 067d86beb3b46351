use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::app::Result;
use crate::pipeline::{Delivery, Outgoing, Photo};

/// Prints messages to stdout and writes images into an output directory.
pub struct ConsoleDelivery {
    out_dir: PathBuf,
    sequence: AtomicUsize,
}

impl ConsoleDelivery {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self {
            out_dir,
            sequence: AtomicUsize::new(0),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn next_path(&self, kind: &str) -> PathBuf {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        self.out_dir.join(format!("{kind}-{stamp}-{n:03}.png"))
    }
}

#[async_trait]
impl Delivery for ConsoleDelivery {
    async fn deliver(&self, message: Outgoing) -> Result<()> {
        match message {
            Outgoing::Chart(png) => {
                let path = self.next_path("trends");
                tokio::fs::write(&path, &png).await?;
                println!("[chart] {}", path.display());
            }
            Outgoing::Photo {
                photo: Photo::Bytes(png),
                caption,
            } => {
                let path = self.next_path("meme");
                tokio::fs::write(&path, &png).await?;
                println!("{caption}\n[image] {}\n", path.display());
            }
            Outgoing::Photo {
                photo: Photo::Url(url),
                caption,
            } => {
                println!("{caption}\n[image] {url}\n");
            }
            Outgoing::Text(text) => println!("{text}"),
        }
        Ok(())
    }
}
