use anyhow::Result;
use log::info;
use std::sync::Arc;

use space_player::build_rocket;
use space_player::config::AppConfig;
use space_player::database::store::CatalogStore;
use space_player::service::catalog::CatalogService;
use space_player::service::ingest::UploadIngest;

#[rocket::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let store = CatalogStore::new(&config.data_file);
    let ingest = UploadIngest::new(&config.video_dir, &config.thumbnail_dir);
    let catalog = Arc::new(CatalogService::new(store, ingest));
    catalog.initialize()?;

    // Pick up video files dropped into storage while the server was down.
    let (imported, total) = tokio::task::spawn_blocking({
        let catalog = catalog.clone();
        move || catalog.scan_library()
    })
    .await??;
    if !imported.is_empty() {
        info!(
            "Startup scan imported {} untracked files ({} total)",
            imported.len(),
            total
        );
    }

    info!("Space Player server starting");
    let _ = build_rocket(&config, catalog).launch().await?;
    Ok(())
}
