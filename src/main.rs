use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use vibeflow_hub::{
    create_router, AppState, CaptureSource, Config, HttpRemoteClient, LiveSession, NullSink,
    Orchestrator,
};

#[derive(Parser, Debug)]
#[command(name = "vibeflow-hub", about = "VibeFlow AI hub service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/vibeflow-hub")]
    config: String,

    /// Override the HTTP bind address from the config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let api_key = std::env::var(&cfg.remote.api_key_env)
        .with_context(|| format!("API key not set ({})", cfg.remote.api_key_env))?;

    let client = Arc::new(HttpRemoteClient::new(&cfg.remote, api_key));

    let orchestrator = Arc::new(Orchestrator::new(client.clone(), &cfg.orchestrator));

    // TODO: cpal capture/playback backends; until then the live session
    // reports a permission error on start
    let live = Arc::new(LiveSession::new(
        cfg.audio.clone(),
        client,
        CaptureSource::Microphone,
        Box::new(NullSink::new()),
    ));

    let state = AppState::new(orchestrator.clone(), live.clone(), cfg.audio);
    let router = create_router(state);

    let addr = match &args.bind {
        Some(bind) => bind.clone(),
        None => format!("{}:{}", cfg.service.http.bind, cfg.service.http.port),
    };

    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let serve = axum::serve(listener, router);

    tokio::select! {
        result = serve => {
            result.context("HTTP server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            orchestrator.shutdown();
            live.stop().await.ok();
        }
    }

    Ok(())
}
