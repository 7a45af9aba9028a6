use std::sync::Arc;

use nftboard::{
    collections_router, init_logging, log_app_bind, log_app_start, log_dataset_loaded,
    log_favorites_store_selected, logging_config_from_env, server_config_from_env,
    CollectionDataset, Favorites, FavoritesStore, FileFavoritesStore, InMemoryFavoritesStore,
    ServerConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let cfg = server_config_from_env()?;

    let dataset = match &cfg.data_path {
        Some(path) => {
            let dataset = CollectionDataset::load(path)?;
            log_dataset_loaded(&path.display().to_string(), &dataset);
            dataset
        }
        None => {
            let dataset = CollectionDataset::bundled()?;
            log_dataset_loaded("bundled", &dataset);
            dataset
        }
    };

    let favorites = Favorites::open(favorites_store(&cfg))?;
    let app = collections_router(Arc::new(dataset), favorites);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn favorites_store(cfg: &ServerConfig) -> Arc<dyn FavoritesStore> {
    match &cfg.favorites_dir {
        Some(dir) => {
            log_favorites_store_selected("file", Some(dir.as_path()));
            Arc::new(FileFavoritesStore::new(dir.clone()))
        }
        None => {
            log_favorites_store_selected("memory", None);
            Arc::new(InMemoryFavoritesStore::new())
        }
    }
}
