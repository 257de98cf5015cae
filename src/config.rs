use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment-driven configuration (`DATA_FILE`, `VIDEO_DIR`,
/// `THUMBNAIL_DIR`, `UPLOAD_LIMIT_MB`), with `.env` support via dotenv.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub video_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
    /// Upload ceiling in MB. Unset accepts uploads of any size.
    pub upload_limit_mb: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.json"),
            video_dir: PathBuf::from("videos"),
            thumbnail_dir: PathBuf::from("thumbnails"),
            upload_limit_mb: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        envy::from_env::<AppConfig>().context("Failed to read configuration from environment")
    }
}
