#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use hatim_planner::{
        AuthProvider, HatimStore, LocalHatims, LocalStorage, PlannerConfig, SqliteAuthProvider,
        SqliteHatimRepository, http_api, logging,
    };
    use tracing::info;

    logging::init();
    let config = PlannerConfig::from_env()?;

    let remote = SqliteHatimRepository::new(&config.db_path)?;
    let auth = SqliteAuthProvider::new(&config.db_path)?;
    let local = LocalHatims::new(LocalStorage::file(&config.local_storage_path));

    let mut store = HatimStore::new(Arc::new(remote), local);
    store.begin_session(auth.current_user());
    store.load_all();

    info!(
        addr = %config.http_addr,
        db = %config.db_path.display(),
        "hatim-planner HTTP API listening"
    );
    let state = http_api::AppState::new(store, Arc::new(auth));
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
