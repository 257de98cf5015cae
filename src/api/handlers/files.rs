use anyhow::anyhow;
use rocket::State;
use rocket::http::Status;
use rocket_seek_stream::SeekStream;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{AppError, AppResult};
use crate::service::catalog::CatalogService;

/// Stored video bytes as a seekable stream, so the player can issue HTTP
/// range requests while scrubbing.
#[get("/videos/<file..>")]
pub async fn video_file(
    catalog: &State<Arc<CatalogService>>,
    file: PathBuf,
) -> AppResult<SeekStream<'static>> {
    let path = catalog.ingest().video_dir().join(&file);
    SeekStream::from_path(&path).map_err(|_| AppError {
        status: Status::NotFound,
        error: anyhow!("Video file not found: {}", file.display()),
    })
}

pub fn generate_file_routes() -> Vec<rocket::Route> {
    routes![video_file]
}
