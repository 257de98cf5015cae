use anyhow::{Context, Result};
use log::{info, warn};
use rocket::fs::TempFile;
use std::fs;
use std::path::{Path, PathBuf};

use super::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRole {
    Video,
    Thumbnail,
}

impl MediaRole {
    fn accepts(self, top: &str) -> bool {
        match self {
            MediaRole::Video => top == "video",
            MediaRole::Thumbnail => top == "image",
        }
    }

    fn mime_class(self) -> &'static str {
        match self {
            MediaRole::Video => "video",
            MediaRole::Thumbnail => "image",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaRole::Video => "video",
            MediaRole::Thumbnail => "thumbnail",
        }
    }
}

/// Metadata of a stored upload, merged into the record by the catalog
/// service.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub size_bytes: u64,
}

/// Writes incoming video/thumbnail payloads into their storage areas under a
/// collision-free, path-safe filename derived from the record id.
#[derive(Debug, Clone)]
pub struct UploadIngest {
    video_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl UploadIngest {
    pub fn new(video_dir: impl Into<PathBuf>, thumbnail_dir: impl Into<PathBuf>) -> Self {
        Self {
            video_dir: video_dir.into(),
            thumbnail_dir: thumbnail_dir.into(),
        }
    }

    pub fn initialize(&self) -> Result<()> {
        for dir in [&self.video_dir, &self.thumbnail_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                info!("Created folder {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    pub fn thumbnail_dir(&self) -> &Path {
        &self.thumbnail_dir
    }

    pub fn media_path(&self, role: MediaRole, filename: &str) -> PathBuf {
        match role {
            MediaRole::Video => self.video_dir.join(filename),
            MediaRole::Thumbnail => self.thumbnail_dir.join(filename),
        }
    }

    /// Validates the MIME class for the role and moves the temp file into
    /// storage. The stored name combines the record id with a sanitized
    /// rendition of the client-supplied name.
    pub async fn store(
        &self,
        file: &mut TempFile<'_>,
        role: MediaRole,
        id: &str,
    ) -> Result<StoredFile, CatalogError> {
        let top = file
            .content_type()
            .map(|ct| ct.top().as_str().to_ascii_lowercase())
            .unwrap_or_default();
        if !role.accepts(&top) {
            return Err(CatalogError::InvalidFileType(format!(
                "Only {} files are allowed for the {} field",
                role.mime_class(),
                role.label()
            )));
        }

        let stored_name = stored_filename(file, id);
        let size_bytes = file.len();
        let destination = self.media_path(role, &stored_name);
        file.move_copy_to(&destination)
            .await
            .with_context(|| {
                format!(
                    "Failed to store {} file at {}",
                    role.label(),
                    destination.display()
                )
            })
            .map_err(CatalogError::Storage)?;

        info!(
            "Stored {} file {} ({} bytes)",
            role.label(),
            stored_name,
            size_bytes
        );
        Ok(StoredFile {
            filename: stored_name,
            size_bytes,
        })
    }

    pub fn remove(&self, role: MediaRole, filename: &str) -> Result<()> {
        let path = self.media_path(role, filename);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete {} file {}", role.label(), path.display()))
    }

    /// Best-effort removal: failures are logged, never propagated, so record
    /// cleanup is not blocked by a stubborn file.
    pub fn remove_logged(&self, role: MediaRole, filename: &str) {
        if let Err(error) = self.remove(role, filename) {
            warn!("{error:#}");
        }
    }
}

fn stored_filename(file: &TempFile<'_>, id: &str) -> String {
    let base = file.name().unwrap_or("file");
    let original = match file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| ext.as_str().to_ascii_lowercase())
    {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    };
    format!("{}_{}", id, sanitize_filename(&original))
}

/// Keeps alphanumerics, `.` and `-`; everything else becomes `_`. Blocks
/// path traversal and shell-hostile names in one pass.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
