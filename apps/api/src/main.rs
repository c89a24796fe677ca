mod analysis;
mod compile;
mod config;
mod errors;
mod llm_client;
mod refine;
mod routes;
mod state;
mod tailor;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::compile::TectonicCompiler;
use crate::config::Config;
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Tailor API v{}", env!("CARGO_PKG_VERSION"));

    let llm = OpenAiClient::from_config(&config)?;
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /api/tailor will return a configuration error");
    }
    info!("LLM client initialized (model: {})", llm.model());

    let compiler = TectonicCompiler::from_config(&config);
    info!(
        "LaTeX compiler: {} (timeout {}s)",
        compiler.binary(),
        config.compile_timeout.as_secs()
    );

    let state = AppState {
        llm: Arc::new(llm),
        compiler: Arc::new(compiler),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
