use std::sync::Arc;

use funnelcraft::api::{self, AppState};
use funnelcraft::config::AppConfig;
use funnelcraft::content::{ContentGenerator, GeminiGenerator};
use funnelcraft::mailer::{MailConfig, Mailer};
use funnelcraft::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GEMINI_API_KEY=...");
        std::process::exit(1);
    });

    eprintln!("🧲 funnelcraft v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.gemini.model);
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!("   Database: {}", config.db_path.display());

    let generator: Arc<dyn ContentGenerator> = Arc::new(GeminiGenerator::new(config.gemini.clone())?);

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {e}",
                    config.db_path.display()
                );
                std::process::exit(1);
            }),
    );

    let mailer = MailConfig::from_env().map(|mail_config| {
        eprintln!("   SMTP: {}:{}", mail_config.host, mail_config.port);
        Arc::new(Mailer::new(mail_config))
    });
    if mailer.is_none() {
        eprintln!("   SMTP: not configured (sends simulated)");
    }

    let app = api::router(AppState {
        db,
        generator,
        mailer,
        pace_override: None,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
