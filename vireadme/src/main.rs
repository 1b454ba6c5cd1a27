use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vireadme::api::{create_router, AppState};
use vireadme::config::{Config, LogFormat};
use vireadme::ocr::{OcrEngine, TesseractEngine};

#[derive(Parser)]
#[command(name = "vireadme")]
#[command(about = "Camera-friendly OCR service that reads text aloud in the browser")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // Logging goes up first so config parsing can report invalid values.
    init_tracing(LogFormat::from_env());

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let ocr: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::new(&config.ocr));
    tracing::info!(
        default_language = %config.ocr.default_language,
        timeout_secs = config.ocr.timeout_secs,
        "Tesseract OCR engine configured"
    );

    let state = AppState::new(config.clone(), ocr);
    state.uploads.ensure_dir().await?;
    tracing::info!(
        folder = %state.uploads.upload_dir().display(),
        cleanup_delay_secs = state.uploads.cleanup_delay().as_secs(),
        "Upload directory ready"
    );

    let uploads = state.uploads.clone();
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("VI-ReadMe starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    uploads.shutdown().await;
    tracing::info!("VI-ReadMe stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vireadme=info,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cleaning up temp files...");
}
