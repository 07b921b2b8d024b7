use std::sync::Arc;
use std::time::Duration;

use online_leads_eligibility::{
    auth::PgAccessGate,
    config::Config,
    db::Database,
    eligibility::EligibilityService,
    handlers::{self, AppState},
    history::PgCallHistory,
    pincode_client::PincodeServiceClient,
    sectors::PgSectorCatalog,
    thresholds::{CachedThresholdProvider, PgThresholdProvider},
};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database pool, the threshold
/// cache and the pincode client, then serves the eligibility endpoint.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "online_leads_eligibility=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let thresholds = CachedThresholdProvider::new(
        Arc::new(PgThresholdProvider::new(db.pool.clone())),
        Duration::from_secs(config.threshold_cache_ttl_secs),
    );
    tracing::info!(
        "Threshold cache initialized ({}s TTL)",
        config.threshold_cache_ttl_secs
    );

    let pincodes = PincodeServiceClient::new(
        config.pincode_service_url.clone(),
        Duration::from_secs(config.pincode_timeout_secs),
    )?;
    tracing::info!("✓ Pincode client initialized: {}", config.pincode_service_url);

    let service = EligibilityService::new(
        config.api_name.clone(),
        Arc::new(PgAccessGate::new(db.pool.clone())),
        Arc::new(thresholds),
        Arc::new(pincodes),
        Arc::new(PgSectorCatalog::new(db.pool.clone())),
        Arc::new(PgCallHistory::new(db.pool.clone())),
    );
    let app_state = Arc::new(AppState { service });

    // 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::protected_routes().layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    let app = handlers::app(app_state, protected_routes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Peer addresses feed the rate limiter when no proxy headers are present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
