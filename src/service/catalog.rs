use anyhow::Result;
use chrono::Utc;
use log::info;
use std::collections::HashSet;
use std::fs;
use std::sync::Mutex;
use walkdir::WalkDir;

use super::CatalogError;
use super::ingest::{MediaRole, StoredFile, UploadIngest};
use crate::common::{DEFAULT_DURATION, DEFAULT_THUMBNAIL, VALID_VIDEO_EXTENSIONS};
use crate::database::store::CatalogStore;
use crate::models::stats::CatalogStats;
use crate::models::video::{Category, VideoRecord, is_valid_duration, title_from_filename};
use crate::utils::{PathExt, format_file_size, new_record_id};

/// User-supplied text fields of a create or edit request, still unvalidated.
#[derive(Debug, Default, Clone)]
pub struct VideoDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
}

impl VideoDraft {
    /// Create requires a title and a duration; category and description fall
    /// back to their defaults.
    pub fn validate_for_create(&self) -> Result<(), CatalogError> {
        required(self.title.as_deref(), "Title is required")?;
        required(self.duration.as_deref(), "Duration is required")?;
        Ok(())
    }
}

fn required(value: Option<&str>, message: &str) -> Result<String, CatalogError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(CatalogError::validation(message)),
    }
}

/// The catalog API. Every mutation is a load-mutate-save over the whole
/// document; `write_lock` serializes those cycles so two mutating requests
/// can never interleave and drop an update.
#[derive(Debug)]
pub struct CatalogService {
    store: CatalogStore,
    ingest: UploadIngest,
    write_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(store: CatalogStore, ingest: UploadIngest) -> Self {
        Self {
            store,
            ingest,
            write_lock: Mutex::new(()),
        }
    }

    pub fn ingest(&self) -> &UploadIngest {
        &self.ingest
    }

    /// Pre-creates the catalog document and both storage areas.
    pub fn initialize(&self) -> Result<()> {
        self.store.initialize()?;
        self.ingest.initialize()
    }

    /// All records, most recently created first (new records are prepended).
    pub fn list(&self) -> Vec<VideoRecord> {
        self.store.load_all()
    }

    /// Case-insensitive substring search over title, description and
    /// category; an empty query returns the full catalog in list order.
    pub fn search(&self, query: &str) -> Vec<VideoRecord> {
        let needle = query.trim().to_lowercase();
        let videos = self.store.load_all();
        if needle.is_empty() {
            return videos;
        }
        videos
            .into_iter()
            .filter(|video| video.matches(&needle))
            .collect()
    }

    /// Returns the record for playback, persisting a view-count increment
    /// before it is handed out.
    pub fn get_for_playback(&self, id: &str) -> Result<VideoRecord, CatalogError> {
        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let video = videos
            .iter_mut()
            .find(|video| video.id == id)
            .ok_or(CatalogError::NotFound)?;
        video.views += 1;
        let snapshot = video.clone();
        self.store.save_all(&videos)?;
        info!("Playing: {} ({} views)", snapshot.title, snapshot.views);
        Ok(snapshot)
    }

    /// Merges stored-file metadata and draft fields into a new record and
    /// prepends it to the catalog. The caller owns cleanup of the stored
    /// files if this fails.
    pub fn create(
        &self,
        id: String,
        draft: VideoDraft,
        video: StoredFile,
        thumbnail: Option<StoredFile>,
    ) -> Result<(VideoRecord, usize), CatalogError> {
        let title = required(draft.title.as_deref(), "Title is required")?;
        let duration = required(draft.duration.as_deref(), "Duration is required")?;
        let record = VideoRecord {
            id,
            title,
            description: draft.description.unwrap_or_default(),
            category: Category::parse(draft.category.as_deref().unwrap_or_default()),
            duration,
            filename: video.filename,
            thumbnail_filename: thumbnail
                .map(|t| t.filename)
                .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string()),
            views: 0,
            upload_timestamp: Utc::now(),
            size_label: format_file_size(video.size_bytes),
            externally_imported: false,
        };

        let _guard = self.lock();
        let mut videos = self.store.load_all();
        videos.insert(0, record.clone());
        self.store.save_all(&videos)?;
        info!("Video uploaded: {} ({})", record.title, record.id);
        Ok((record, videos.len()))
    }

    /// Replaces the four mutable text fields in place; id, filename,
    /// thumbnail and views are untouched.
    pub fn update(&self, id: &str, draft: VideoDraft) -> Result<VideoRecord, CatalogError> {
        let title = required(draft.title.as_deref(), "Title is required")?;
        let category = required(draft.category.as_deref(), "Category is required")?;
        let duration = required(draft.duration.as_deref(), "Duration is required")?;
        if !is_valid_duration(&duration) {
            return Err(CatalogError::validation(format!(
                "Invalid duration format: {duration}"
            )));
        }

        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let video = videos
            .iter_mut()
            .find(|video| video.id == id)
            .ok_or(CatalogError::NotFound)?;
        video.title = title;
        video.description = draft.description.unwrap_or_default();
        video.category = Category::parse(&category);
        video.duration = duration;
        let snapshot = video.clone();
        self.store.save_all(&videos)?;
        info!("Video updated: {}", snapshot.title);
        Ok(snapshot)
    }

    /// Points the record at an already-stored thumbnail file, then drops the
    /// previous one unless it is the sentinel. The caller owns cleanup of
    /// `stored` if this fails.
    pub fn replace_thumbnail(
        &self,
        id: &str,
        stored: StoredFile,
    ) -> Result<VideoRecord, CatalogError> {
        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let video = videos
            .iter_mut()
            .find(|video| video.id == id)
            .ok_or(CatalogError::NotFound)?;
        let previous = std::mem::replace(&mut video.thumbnail_filename, stored.filename);
        let snapshot = video.clone();
        self.store.save_all(&videos)?;
        if previous != DEFAULT_THUMBNAIL {
            self.ingest.remove_logged(MediaRole::Thumbnail, &previous);
        }
        info!("Thumbnail updated for: {}", snapshot.title);
        Ok(snapshot)
    }

    /// Removes the record, persists the catalog without it, and only then
    /// best-effort deletes the backing files. A failed file deletion is
    /// logged and never blocks record removal.
    pub fn delete(&self, id: &str) -> Result<(VideoRecord, usize), CatalogError> {
        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let index = videos
            .iter()
            .position(|video| video.id == id)
            .ok_or(CatalogError::NotFound)?;
        let removed = videos.remove(index);
        self.store.save_all(&videos)?;

        self.ingest.remove_logged(MediaRole::Video, &removed.filename);
        if removed.has_custom_thumbnail() {
            self.ingest
                .remove_logged(MediaRole::Thumbnail, &removed.thumbnail_filename);
        }
        info!("Video deleted: {} ({} remaining)", removed.title, videos.len());
        Ok((removed, videos.len()))
    }

    /// Synthesizes a record for a file already present in video storage.
    pub fn register_external(&self, filename: &str) -> Result<VideoRecord, CatalogError> {
        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let record = self.external_record(filename);
        videos.insert(0, record.clone());
        self.store.save_all(&videos)?;
        info!("Registered external video file {filename}");
        Ok(record)
    }

    /// Authoritative storage listing: registers every video file in the
    /// storage area that no record references. Returns the newly imported
    /// records and the resulting catalog size.
    pub fn scan_library(&self) -> Result<(Vec<VideoRecord>, usize), CatalogError> {
        let _guard = self.lock();
        let mut videos = self.store.load_all();
        let known: HashSet<String> = videos.iter().map(|video| video.filename.clone()).collect();

        let mut imported = Vec::new();
        for entry in WalkDir::new(self.ingest.video_dir())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry.path().ext_lower();
            if !VALID_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }
            let Some(filename) = entry.file_name().to_str() else {
                continue;
            };
            if known.contains(filename) {
                continue;
            }
            imported.push(self.external_record(filename));
        }

        if imported.is_empty() {
            return Ok((imported, videos.len()));
        }
        videos.splice(0..0, imported.iter().cloned());
        self.store.save_all(&videos)?;
        info!("Imported {} untracked video files", imported.len());
        Ok((imported, videos.len()))
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::compute(&self.store.load_all())
    }

    fn external_record(&self, filename: &str) -> VideoRecord {
        let size_label = fs::metadata(self.ingest.media_path(MediaRole::Video, filename))
            .map(|meta| format_file_size(meta.len()))
            .unwrap_or_else(|_| format_file_size(0));
        VideoRecord {
            id: new_record_id(),
            title: title_from_filename(filename),
            description: String::new(),
            category: Category::default(),
            duration: DEFAULT_DURATION.to_string(),
            filename: filename.to_string(),
            thumbnail_filename: DEFAULT_THUMBNAIL.to_string(),
            views: 0,
            upload_timestamp: Utc::now(),
            size_label,
            externally_imported: true,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means a writer panicked; the document itself
        // stays consistent thanks to the atomic rename.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
