#[macro_use]
extern crate rocket;

pub mod api;
pub mod common;
pub mod config;
pub mod database;
pub mod models;
pub mod service;
pub mod utils;

use rocket::data::{ByteUnit, Limits, ToByteUnit};
use rocket::fs::FileServer;
use std::sync::Arc;

use crate::api::handlers::files::generate_file_routes;
use crate::api::handlers::system::generate_system_routes;
use crate::api::handlers::upload::generate_upload_routes;
use crate::api::handlers::videos::generate_video_routes;
use crate::config::AppConfig;
use crate::service::catalog::CatalogService;

pub fn build_rocket(
    config: &AppConfig,
    catalog: Arc<CatalogService>,
) -> rocket::Rocket<rocket::Build> {
    let thumbnail_dir = catalog.ingest().thumbnail_dir().to_path_buf();
    let figment = rocket::Config::figment().merge(("limits", upload_limits(config)));

    rocket::custom(figment)
        .manage(catalog)
        .mount("/", generate_video_routes())
        .mount("/", generate_upload_routes())
        .mount("/", generate_system_routes())
        .mount("/", generate_file_routes())
        .mount("/thumbnails", FileServer::from(thumbnail_dir))
}

fn upload_limits(config: &AppConfig) -> Limits {
    match config.upload_limit_mb {
        // Slack on top of the file limit covers the multipart text fields,
        // so the file ceiling is what actually trips 413.
        Some(mb) => Limits::default()
            .limit("file", mb.mebibytes())
            .limit("data-form", (mb + 8).mebibytes()),
        None => Limits::default()
            .limit("file", ByteUnit::max_value())
            .limit("data-form", ByteUnit::max_value()),
    }
}
