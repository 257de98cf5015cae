use log::info;
use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::api::AppResult;
use crate::models::video::VideoRecord;
use crate::service::catalog::{CatalogService, VideoDraft};

#[get("/api/videos")]
pub async fn list_videos(
    catalog: &State<Arc<CatalogService>>,
) -> AppResult<Json<Vec<VideoRecord>>> {
    let catalog = catalog.inner().clone();
    let videos = spawn_blocking(move || catalog.list()).await?;
    info!("Returning {} videos", videos.len());
    Ok(Json(videos))
}

#[get("/api/search?<q>")]
pub async fn search_videos(
    catalog: &State<Arc<CatalogService>>,
    q: Option<String>,
) -> AppResult<Json<Vec<VideoRecord>>> {
    let catalog = catalog.inner().clone();
    let query = q.unwrap_or_default();
    let results = spawn_blocking(move || {
        let results = catalog.search(&query);
        info!("Found {} results for \"{}\"", results.len(), query);
        results
    })
    .await?;
    Ok(Json(results))
}

#[get("/api/video/<id>")]
pub async fn get_video(
    catalog: &State<Arc<CatalogService>>,
    id: String,
) -> AppResult<Json<VideoRecord>> {
    let catalog = catalog.inner().clone();
    let video = spawn_blocking(move || catalog.get_for_playback(&id)).await??;
    Ok(Json(video))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditVideoBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub message: String,
    pub video: VideoRecord,
}

#[put("/api/videos/<id>", format = "json", data = "<body>")]
pub async fn update_video(
    catalog: &State<Arc<CatalogService>>,
    id: String,
    body: Json<EditVideoBody>,
) -> AppResult<Json<UpdateResponse>> {
    let catalog = catalog.inner().clone();
    let body = body.into_inner();
    let draft = VideoDraft {
        title: body.title,
        description: body.description,
        category: body.category,
        duration: body.duration,
    };
    let video = spawn_blocking(move || catalog.update(&id, draft)).await??;
    Ok(Json(UpdateResponse {
        message: "Video updated successfully".to_string(),
        video,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedVideo {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub thumbnail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_video: DeletedVideo,
    pub remaining_videos: usize,
}

#[delete("/api/videos/<id>")]
pub async fn delete_video(
    catalog: &State<Arc<CatalogService>>,
    id: String,
) -> AppResult<Json<DeleteResponse>> {
    let catalog = catalog.inner().clone();
    let (removed, remaining) = spawn_blocking(move || catalog.delete(&id)).await??;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Video deleted successfully".to_string(),
        deleted_video: DeletedVideo {
            id: removed.id,
            title: removed.title,
            filename: removed.filename,
            thumbnail: removed.thumbnail_filename,
        },
        remaining_videos: remaining,
    }))
}

pub fn generate_video_routes() -> Vec<rocket::Route> {
    routes![
        list_videos,
        search_videos,
        get_video,
        update_video,
        delete_video
    ]
}
