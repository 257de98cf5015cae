use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::video::VideoRecord;

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

#[derive(Serialize)]
struct CatalogDocumentRef<'a> {
    videos: &'a [VideoRecord],
}

/// Whole-catalog persistence over a single JSON document. Loads fail soft
/// (missing, empty or corrupted documents are served as an empty catalog and
/// logged); saves replace the document atomically via a temp-file rename so a
/// concurrent reader never observes a partial write.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pre-creates the document on startup, resetting it if unreadable.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        match fs::read_to_string(&self.path) {
            Ok(raw)
                if !raw.trim().is_empty()
                    && serde_json::from_str::<CatalogDocument>(&raw).is_ok() =>
            {
                Ok(())
            }
            Ok(_) => {
                warn!("Fixing unreadable catalog document {}", self.path.display());
                self.save_all(&[])
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("Created catalog document {}", self.path.display());
                self.save_all(&[])
            }
            Err(error) => Err(error)
                .with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    pub fn load_all(&self) -> Vec<VideoRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!(
                    "Catalog document {} is missing, serving empty catalog",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(error) => {
                warn!(
                    "Failed to read catalog document {}: {error}",
                    self.path.display()
                );
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            warn!(
                "Catalog document {} is empty, serving empty catalog",
                self.path.display()
            );
            return Vec::new();
        }
        match serde_json::from_str::<CatalogDocument>(&raw) {
            Ok(document) => document.videos,
            Err(error) => {
                warn!(
                    "Catalog document {} is corrupted ({error}), serving empty catalog",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    pub fn save_all(&self, videos: &[VideoRecord]) -> Result<()> {
        let body = serde_json::to_vec_pretty(&CatalogDocumentRef { videos })
            .context("Failed to serialize catalog")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &body)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
