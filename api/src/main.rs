mod config;
mod handler;
mod service;

use axum::{
    routing::{get, put},
    Router,
};
use config::ApiConfig;
use connectors::{spawn_fetch, CurrencyLayerClient, CurrencyLayerConfig, ExchangeRateClient};
use service::{ShopService, SharedService};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Peas shop API");

    // Load configuration from environment
    let api_config = ApiConfig::from_env();
    let rates_config = CurrencyLayerConfig::from_env();
    if rates_config.api_key.is_none() {
        warn!("CURRENCYLAYER_API_KEY is not set; prices stay in USD until one is configured");
    }

    // Create the exchange rate client
    let client: Arc<dyn ExchangeRateClient> = Arc::new(
        CurrencyLayerClient::from_config(&rates_config)
            .map_err(|e| format!("Failed to create exchange rate client: {}", e))?,
    );

    // Create shop service
    let service: SharedService = Arc::new(RwLock::new(ShopService::new(
        client.clone(),
        rates_config.api_key.clone(),
    )));

    // Warm up the currency list without delaying startup
    let initial_rates = spawn_fetch(client, rates_config.api_key);
    let warm_service = service.clone();
    tokio::spawn(async move {
        match initial_rates.await {
            Ok(Ok(snapshot)) => {
                warm_service.write().await.apply_snapshot(snapshot);
            }
            Ok(Err(e)) => error!("{}", e.user_notice()),
            Err(_) => warn!("Initial rate fetch was dropped before completing"),
        }
    });

    // Create CORS middleware
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Create Axum router with API routes
    let app = Router::new()
        .route("/api/v1/products", get(handler::list_products))
        .route(
            "/api/v1/products/:name/quantity",
            put(handler::update_quantity),
        )
        .route("/api/v1/cart/total", get(handler::get_cart_total))
        .route("/api/v1/currencies", get(handler::list_currencies))
        .route("/api/v1/currency", put(handler::select_currency))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service);

    // Start server
    let addr = api_config.socket_addr()?;
    info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
