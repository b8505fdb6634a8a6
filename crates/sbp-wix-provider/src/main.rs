use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sbp::{PaymentProvider, ProcessorClient, ProcessorConfig};
use sbp_provider::config::ProviderConfig;
use sbp_provider::platform_client::PlatformClient;
use sbp_provider::routes;
use sbp_provider::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let timeout = Duration::from_secs(config.http_timeout_secs);

    let platform = match PlatformClient::new(
        &config.platform_api_url,
        config.platform_api_token.clone(),
        timeout,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to build platform client: {e}");
            std::process::exit(1);
        }
    };

    let processor = match ProcessorClient::with_timeout(
        ProcessorConfig::default().with_api_url(config.sbp_api_url.clone()),
        timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build SBP client: {e}");
            std::process::exit(1);
        }
    };

    let provider = PaymentProvider::new(processor, platform.clone(), platform.clone());

    let state = web::Data::new(AppState {
        provider,
        events: platform,
        platform_token: config.platform_token.clone(),
        metrics_token: config.metrics_token.clone(),
        public_metrics: config.public_metrics,
    });

    let port = config.port;
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Swiss Bitcoin Pay provider listening on port {port}");
    tracing::info!("SBP API: {}", config.sbp_api_url);
    tracing::info!("Rate limit: {rate_limit_rpm} req/min per IP");
    tracing::info!("  POST http://localhost:{port}{}", sbp::WEBHOOK_PATH);
    tracing::info!("  POST http://localhost:{port}/v1/create-transaction");

    let governor_conf = match GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm)
        .finish()
    {
        Some(conf) => conf,
        None => {
            tracing::error!("Invalid RATE_LIMIT_RPM: {rate_limit_rpm}");
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_conf))
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(65_536))
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
