use log::info;
use rocket::State;
use rocket::serde::json::Json;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::api::AppResult;
use crate::models::stats::CatalogStats;
use crate::models::video::VideoRecord;
use crate::service::catalog::CatalogService;

#[get("/api/stats")]
pub async fn get_stats(catalog: &State<Arc<CatalogService>>) -> AppResult<Json<CatalogStats>> {
    let catalog = catalog.inner().clone();
    let stats = spawn_blocking(move || catalog.stats()).await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub message: String,
    pub imported: Vec<VideoRecord>,
    pub total_videos: usize,
}

/// On-demand storage scan: registers every video file the catalog does not
/// reference yet.
#[post("/api/scan")]
pub async fn scan_library(catalog: &State<Arc<CatalogService>>) -> AppResult<Json<ScanResponse>> {
    let catalog = catalog.inner().clone();
    let (imported, total_videos) = spawn_blocking(move || catalog.scan_library()).await??;
    info!("Library scan imported {} files", imported.len());
    Ok(Json(ScanResponse {
        message: format!("Imported {} video files", imported.len()),
        imported,
        total_videos,
    }))
}

pub fn generate_system_routes() -> Vec<rocket::Route> {
    routes![get_stats, scan_library]
}
