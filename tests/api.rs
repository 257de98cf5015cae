use std::fs;
use std::sync::Arc;

use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::Value;
use tempfile::TempDir;

use space_player::build_rocket;
use space_player::config::AppConfig;
use space_player::database::store::CatalogStore;
use space_player::service::catalog::{CatalogService, VideoDraft};
use space_player::service::ingest::{MediaRole, StoredFile, UploadIngest};
use space_player::utils::new_record_id;

fn client(dir: &TempDir) -> (Client, Arc<CatalogService>) {
    let store = CatalogStore::new(dir.path().join("data.json"));
    let ingest = UploadIngest::new(dir.path().join("videos"), dir.path().join("thumbnails"));
    let catalog = Arc::new(CatalogService::new(store, ingest));
    catalog.initialize().unwrap();

    let config = AppConfig {
        data_file: dir.path().join("data.json"),
        video_dir: dir.path().join("videos"),
        thumbnail_dir: dir.path().join("thumbnails"),
        upload_limit_mb: None,
    };
    let client = Client::tracked(build_rocket(&config, catalog.clone())).unwrap();
    (client, catalog)
}

fn seed(catalog: &CatalogService, title: &str) -> String {
    let id = new_record_id();
    let filename = format!("{id}_seed.mp4");
    fs::write(
        catalog.ingest().media_path(MediaRole::Video, &filename),
        b"seed video",
    )
    .unwrap();
    let (record, _) = catalog
        .create(
            id,
            VideoDraft {
                title: Some(title.to_string()),
                duration: Some("2:15".to_string()),
                ..VideoDraft::default()
            },
            StoredFile {
                filename,
                size_bytes: 10,
            },
            None,
        )
        .unwrap();
    record.id
}

const BOUNDARY: &str = "X-SPACE-PLAYER-BOUNDARY";

fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> ContentType {
    ContentType::parse_flexible(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap()
}

#[test]
fn empty_catalog_lists_empty_array() {
    let dir = TempDir::new().unwrap();
    let (client, _) = client(&dir);
    let response = client.get("/api/videos").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_json::<Value>().unwrap(), serde_json::json!([]));
}

#[test]
fn upload_then_playback_flow() {
    let dir = TempDir::new().unwrap();
    let (client, _) = client(&dir);

    let body = multipart(
        &[("title", "Launch Day"), ("duration", "2:15")],
        &[("video", "clip one.mp4", "video/mp4", b"fake video bytes")],
    );
    let response = client
        .post("/api/upload")
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let uploaded = response.into_json::<Value>().unwrap();
    assert_eq!(uploaded["message"], "Video uploaded successfully");
    assert_eq!(uploaded["totalVideos"], 1);
    let video = &uploaded["video"];
    assert_eq!(video["category"], "Not Categorized");
    assert_eq!(video["thumbnailFilename"], "SpacePlayer.png");
    assert_eq!(video["views"], 0);
    let id = video["id"].as_str().unwrap().to_string();
    let filename = video["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("_clip_one.mp4"));
    assert!(dir.path().join("videos").join(&filename).exists());

    let played = client
        .get(format!("/api/video/{id}"))
        .dispatch()
        .into_json::<Value>()
        .unwrap();
    assert_eq!(played["views"], 1);

    // The stored bytes are served back under /videos.
    let file_response = client.get(format!("/videos/{filename}")).dispatch();
    assert_eq!(file_response.status(), Status::Ok);
    assert_eq!(
        file_response.into_bytes().unwrap(),
        b"fake video bytes".to_vec()
    );

    let stats = client
        .get("/api/stats")
        .dispatch()
        .into_json::<Value>()
        .unwrap();
    assert_eq!(stats["totalVideos"], 1);
    assert_eq!(stats["totalViews"], 1);
}

#[test]
fn upload_rejects_wrong_mime_class() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);

    let body = multipart(
        &[("title", "Nope"), ("duration", "1:00")],
        &[("video", "notes.txt", "text/plain", b"not a video")],
    );
    let response = client
        .post("/api/upload")
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert!(catalog.list().is_empty());
}

#[test]
fn upload_requires_title() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);

    let body = multipart(
        &[("duration", "1:00")],
        &[("video", "clip.mp4", "video/mp4", b"bytes")],
    );
    let response = client
        .post("/api/upload")
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert!(catalog.list().is_empty());
}

#[test]
fn update_and_delete_flow() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);
    let id = seed(&catalog, "Before");

    let response = client
        .put(format!("/api/videos/{id}"))
        .header(ContentType::JSON)
        .body(r#"{"title":"After","description":"","category":"Movies","duration":"10:00"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let updated = response.into_json::<Value>().unwrap();
    assert_eq!(updated["video"]["title"], "After");
    assert_eq!(updated["video"]["category"], "Movies");

    let response = client
        .put(format!("/api/videos/{id}"))
        .header(ContentType::JSON)
        .body(r#"{"title":"After","description":"","category":"Movies","duration":"abc"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .put("/api/videos/missing")
        .header(ContentType::JSON)
        .body(r#"{"title":"T","description":"","category":"Live","duration":"1:00"}"#)
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client.delete(format!("/api/videos/{id}")).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let deleted = response.into_json::<Value>().unwrap();
    assert_eq!(deleted["success"], true);
    assert_eq!(deleted["remainingVideos"], 0);
    assert_eq!(deleted["deletedVideo"]["id"], id.as_str());

    let response = client.delete(format!("/api/videos/{id}")).dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn search_filters_by_term() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);
    seed(&catalog, "Moon Landing");
    seed(&catalog, "Cooking Show");

    let results = client
        .get("/api/search?q=moon")
        .dispatch()
        .into_json::<Vec<Value>>()
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Moon Landing");

    let all = client
        .get("/api/search?q=")
        .dispatch()
        .into_json::<Vec<Value>>()
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn scan_imports_untracked_files() {
    let dir = TempDir::new().unwrap();
    let (client, _) = client(&dir);
    fs::write(dir.path().join("videos").join("orphan_clip.mp4"), b"bytes").unwrap();

    let response = client.post("/api/scan").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let scanned = response.into_json::<Value>().unwrap();
    assert_eq!(scanned["totalVideos"], 1);
    assert_eq!(scanned["imported"][0]["title"], "Orphan Clip");
    assert_eq!(scanned["imported"][0]["externallyImported"], true);
}

#[test]
fn thumbnail_replace_over_http() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);
    let id = seed(&catalog, "Thumbed");

    let body = multipart(
        &[],
        &[("thumbnail", "cover.png", "image/png", b"png bytes")],
    );
    let response = client
        .put(format!("/api/videos/{id}/thumbnail"))
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let updated = response.into_json::<Value>().unwrap();
    let thumbnail = updated["video"]["thumbnailFilename"].as_str().unwrap();
    assert!(thumbnail.ends_with("_cover.png"));
    assert!(dir.path().join("thumbnails").join(thumbnail).exists());

    // Unknown id: 404, and the freshly stored file is rolled back.
    let body = multipart(
        &[],
        &[("thumbnail", "cover.png", "image/png", b"png bytes")],
    );
    let response = client
        .put("/api/videos/missing/thumbnail")
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let leftovers: Vec<_> = fs::read_dir(dir.path().join("thumbnails"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("missing_"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn wrong_mime_for_thumbnail_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (client, catalog) = client(&dir);
    let id = seed(&catalog, "Clip");

    let body = multipart(&[], &[("thumbnail", "virus.exe", "application/json", b"{}")]);
    let response = client
        .put(format!("/api/videos/{id}/thumbnail"))
        .header(multipart_content_type())
        .body(body)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}
