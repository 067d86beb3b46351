//! Configuration management for memebot.
//!
//! Configuration is read from `~/.config/memebot/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; defaults to `<data dir>/memebot/memebot.db`
    pub database: Option<PathBuf>,
    pub sources: SourcesConfig,
    pub selection: SelectionConfig,
    pub watermark: WatermarkConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub base_url: String,
    /// Groups fetched by the browse flow
    pub browse_groups: Vec<String>,
    /// Items fetched per group when browsing
    pub browse_limit: usize,
    /// Groups fetched by the search flow
    pub search_groups: Vec<String>,
    /// Items fetched per group when searching
    pub search_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_url: crate::source::reddit::DEFAULT_BASE_URL.to_string(),
            browse_groups: vec![
                "memes".to_string(),
                "dankmemes".to_string(),
                "wholesomememes".to_string(),
            ],
            browse_limit: 10,
            search_groups: vec!["memes".to_string(), "dankmemes".to_string()],
            search_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Items delivered by the browse flow, highest score first
    pub top_n: usize,
    /// Terms kept in each trend snapshot
    pub trend_top_k: usize,
    /// Image matches processed by the search flow
    pub max_search_images: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            trend_top_k: crate::trends::DEFAULT_TOP_K,
            max_search_images: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub label: String,
    /// Font files tried in order; the builtin bitmap font is the last resort
    pub fonts: Vec<String>,
    /// Extra directories searched before the platform font directories
    pub font_dirs: Vec<PathBuf>,
    /// Distance of the label from the left edge, in pixels
    pub margin: i32,
    /// Space between the label and the edge of its backing plate
    pub padding: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            label: "MemeBot".to_string(),
            fonts: vec!["arial.ttf".to_string(), "DejaVuSans.ttf".to_string()],
            font_dirs: Vec::new(),
            margin: 20,
            padding: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("memebot/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating a commented default there if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/memebot/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("memebot").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# memebot configuration

# SQLite database file (default: <data dir>/memebot/memebot.db)
# database = "/var/lib/memebot/memebot.db"

[sources]
base_url = "https://www.reddit.com"

# Browse: N posts from each group in the chosen order (hot/new/top/rising)
browse_groups = ["memes", "dankmemes", "wholesomememes"]
browse_limit = 10

# Search: top posts from each group, filtered by keyword
search_groups = ["memes", "dankmemes"]
search_limit = 50

[selection]
top_n = 5
trend_top_k = 5
max_search_images = 5

[watermark]
label = "MemeBot"

# Tried in order; falls back to a builtin bitmap font
fonts = ["arial.ttf", "DejaVuSans.ttf"]
font_dirs = []

margin = 20
padding = 5

[http]
user_agent = "memebot/0.1.0"
timeout_secs = 10
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.sources.browse_groups.len(), 3);
        assert_eq!(config.sources.search_limit, 50);
        assert_eq!(config.watermark.label, "MemeBot");
        assert_eq!(config.watermark.fonts, vec!["arial.ttf", "DejaVuSans.ttf"]);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[watermark]
label = "Hello"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.watermark.label, "Hello");
        assert_eq!(config.watermark.margin, 20);
        assert_eq!(config.selection.top_n, 5);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.sources.browse_limit, 10);
        assert_eq!(config.http.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.selection.max_search_images, 5);

        // the written file loads back
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.sources.search_groups, vec!["memes", "dankmemes"]);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sources\nbrowse_limit = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
