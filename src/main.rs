//! City Persona - Entry Point
//!
//! Loads the city catalog, builds the selection engine and serves the game
//! API over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use city_persona::catalog::load_catalog;
use city_persona::core::config::ServerConfig;
use city_persona::core::error::Result;
use city_persona::llm::LlmClient;
use city_persona::selection::CitySelectionEngine;
use city_persona::server::{router, AppState};

/// City Persona game server
#[derive(Parser, Debug)]
#[command(name = "city-persona")]
#[command(about = "Serve diversity-constrained city selection and LLM personas")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding <tier>_cities.json files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("city_persona=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let catalog = load_catalog(&config.data_dir);
    if catalog.is_empty() {
        tracing::warn!("City catalog is empty - every selection will fail");
    }
    let engine = CitySelectionEngine::new(catalog);

    let llm = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!("Persona generation enabled with model {}", client.model());
            Some(client)
        }
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - running without persona generation");
            None
        }
    };

    let state = Arc::new(AppState::new(engine, llm, &config));
    let app = router(state, &config.allowed_origins);

    let addr = config.bind_addr();
    tracing::info!("City Persona API starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
