//! MoodFlow backend entry point
use anyhow::Context;
use moodflow_lib::config::AppConfig;
use moodflow_lib::service::CommonService;
use moodflow_server::create_router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodflow_server=info,moodflow_lib=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let service = CommonService::from_config(&config).await?;
    let app = create_router(service, &config.cors_origin)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("MoodFlow server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
