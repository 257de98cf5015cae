use anyhow::anyhow;
use rocket::State;
use rocket::form::{Errors, Form, FromForm};
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::api::{AppError, AppResult};
use crate::models::video::VideoRecord;
use crate::service::CatalogError;
use crate::service::catalog::{CatalogService, VideoDraft};
use crate::service::ingest::MediaRole;
use crate::utils::new_record_id;

#[derive(FromForm, Debug)]
pub struct UploadForm<'r> {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub video: Option<TempFile<'r>>,
    pub thumbnail: Option<TempFile<'r>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub video: VideoRecord,
    pub total_videos: usize,
}

#[post("/api/upload", data = "<form>")]
pub async fn upload_video(
    catalog: &State<Arc<CatalogService>>,
    form: Result<Form<UploadForm<'_>>, Errors<'_>>,
) -> AppResult<Json<UploadResponse>> {
    let UploadForm {
        title,
        description,
        category,
        duration,
        video,
        thumbnail,
    } = parse_form(form)?;

    let draft = VideoDraft {
        title,
        description,
        category,
        duration,
    };
    // Reject missing fields before anything touches the storage areas.
    draft.validate_for_create()?;
    let Some(mut video_file) = video else {
        return Err(CatalogError::validation("Video file is required").into());
    };

    let id = new_record_id();
    let ingest = catalog.ingest();
    let stored_video = ingest.store(&mut video_file, MediaRole::Video, &id).await?;
    let stored_thumbnail = match thumbnail {
        Some(mut file) if file.len() > 0 => {
            match ingest.store(&mut file, MediaRole::Thumbnail, &id).await {
                Ok(stored) => Some(stored),
                Err(error) => {
                    ingest.remove_logged(MediaRole::Video, &stored_video.filename);
                    return Err(error.into());
                }
            }
        }
        _ => None,
    };

    let video_name = stored_video.filename.clone();
    let thumbnail_name = stored_thumbnail.as_ref().map(|t| t.filename.clone());
    let service = catalog.inner().clone();
    let result =
        spawn_blocking(move || service.create(id, draft, stored_video, stored_thumbnail)).await?;

    match result {
        Ok((record, total_videos)) => Ok(Json(UploadResponse {
            message: "Video uploaded successfully".to_string(),
            video: record,
            total_videos,
        })),
        Err(error) => {
            // A failed create must not leave orphaned files behind.
            catalog.ingest().remove_logged(MediaRole::Video, &video_name);
            if let Some(name) = thumbnail_name {
                catalog.ingest().remove_logged(MediaRole::Thumbnail, &name);
            }
            Err(error.into())
        }
    }
}

#[derive(FromForm, Debug)]
pub struct ThumbnailForm<'r> {
    pub thumbnail: Option<TempFile<'r>>,
}

#[put("/api/videos/<id>/thumbnail", data = "<form>")]
pub async fn replace_thumbnail(
    catalog: &State<Arc<CatalogService>>,
    id: String,
    form: Result<Form<ThumbnailForm<'_>>, Errors<'_>>,
) -> AppResult<Json<super::videos::UpdateResponse>> {
    let ThumbnailForm { thumbnail } = parse_form(form)?;
    let Some(mut file) = thumbnail else {
        return Err(CatalogError::validation("Thumbnail file is required").into());
    };

    let stored = catalog
        .ingest()
        .store(&mut file, MediaRole::Thumbnail, &id)
        .await?;
    let stored_name = stored.filename.clone();
    let service = catalog.inner().clone();
    let record_id = id.clone();
    match spawn_blocking(move || service.replace_thumbnail(&record_id, stored)).await? {
        Ok(video) => Ok(Json(super::videos::UpdateResponse {
            message: "Thumbnail updated successfully".to_string(),
            video,
        })),
        Err(error) => {
            catalog
                .ingest()
                .remove_logged(MediaRole::Thumbnail, &stored_name);
            Err(error.into())
        }
    }
}

fn parse_form<'r, T>(form: Result<Form<T>, Errors<'r>>) -> Result<T, AppError> {
    match form {
        Ok(form) => Ok(form.into_inner()),
        Err(errors) => {
            // Rocket reports an exceeded data limit here; keep its status so
            // oversize uploads answer 413 rather than a generic 400.
            let status = errors.status();
            let error_chain = errors
                .iter()
                .map(|e| anyhow!(e.to_string()))
                .reduce(|acc, e| acc.context(e.to_string()));

            let error = match error_chain {
                Some(chain) => chain.context("Failed to parse form"),
                None => anyhow!("Failed to parse form with unknown error"),
            };
            Err(AppError { status, error })
        }
    }
}

pub fn generate_upload_routes() -> Vec<rocket::Route> {
    routes![upload_video, replace_thumbnail]
}
