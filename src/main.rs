use restro_pos::{config::Config, Application};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restro_pos=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        db = %config.db_path,
        "Starting restro-pos"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
