use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pyvo::{create_router, AppState, Config};
use pyvo_core::DataStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: PYVO_DATA_DIR (default: pyvo-data)");
            eprintln!("Optional: PYVO_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: PYVO_RELOAD_SECRET (reload hook disabled when unset)");
            eprintln!("Optional: PYVO_BASE_URL (default: https://pyvo.cz)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Pyvo server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Data directory: {}", config.data_dir.display());
    if config.reload_secret.is_none() {
        tracing::info!("Reload hook disabled");
    }

    let store = match DataStore::open(config.data_dir.clone()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to load data: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::from_config(store, &config);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
