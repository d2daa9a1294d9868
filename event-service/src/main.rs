use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use event_service::api;
use event_service::ledger::InventoryLedger;

#[derive(Parser)]
#[command(name = "event-service")]
struct Args {
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let state = api::AppState {
        ledger: Arc::new(InventoryLedger::new()),
    };

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Event service listening on port {}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
