use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use booking_service::api;
use booking_service::client::{BreakerConfig, ClientConfig, RestEventServiceClient};
use booking_service::service::BookingService;
use booking_service::store::BookingStore;

#[derive(Parser)]
#[command(name = "booking-service")]
struct Args {
    #[arg(long, env = "PORT", default_value = "8081")]
    port: u16,

    #[arg(
        long,
        env = "EVENT_SERVICE_URL",
        default_value = "http://event-service:8080"
    )]
    event_service_url: String,

    #[arg(long, env = "BREAKER_FAILURE_THRESHOLD", default_value = "5")]
    breaker_failure_threshold: u32,

    #[arg(long, env = "BREAKER_OPEN_SECS", default_value = "30")]
    breaker_open_secs: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "2000")]
    request_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let client = RestEventServiceClient::new(ClientConfig {
        base_url: args.event_service_url.clone(),
        request_timeout: Duration::from_millis(args.request_timeout_ms),
        breaker: BreakerConfig {
            failure_threshold: args.breaker_failure_threshold,
            open_timeout: Duration::from_secs(args.breaker_open_secs),
        },
    })?;

    let service = BookingService::new(Arc::new(BookingStore::new()), Arc::new(client));
    let state = api::AppState {
        service: Arc::new(service),
    };

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!(
        "Booking service listening on port {}, event service at {}",
        args.port, args.event_service_url
    );

    axum::serve(listener, app).await?;

    Ok(())
}
