use meditrack::{api, config, db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("MediTrack starting v{}", config::APP_VERSION);

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("Cannot create data directory {}: {e}", parent.display());
            std::process::exit(1);
        }
    }

    // Open once up front so migrations run before the first request.
    if let Err(e) = db::open_database(&db_path) {
        tracing::error!("Cannot open database {}: {e}", db_path.display());
        std::process::exit(1);
    }

    let mut server = match api::start_server(db_path, config::bind_address()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start API server: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on http://{}", server.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
}
