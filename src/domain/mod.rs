pub mod item;
pub mod mode;
pub mod record;
pub mod trend;

pub use item::{is_image_url, Item, IMAGE_SUFFIXES};
pub use mode::Mode;
pub use record::{
    BatchSummary, MemeSave, MemeSummary, PersistedMeme, PersistedPost, StoreCounts, StoredTrend,
};
pub use trend::TrendEntry;
