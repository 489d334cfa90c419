use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pharmacy::MongoStore;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(&config.mongodb.database);
    info!(database = %config.mongodb.database, "Connected to MongoDB");

    let store = MongoStore::new(db);
    store
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create indexes: {}", e))?;

    let state = AppState {
        config,
        mongo_client,
    };

    let router =
        axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state, store), &state.config.server)?;
    let app = router
        .merge(api::home::router())
        .merge(health_router(state.config.app));

    info!("Starting pharmacy API");

    let client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, async move {
        info!("Shutting down: closing MongoDB connections");
        client.shutdown().await;
        info!("MongoDB connections closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Pharmacy API shutdown complete");
    Ok(())
}
