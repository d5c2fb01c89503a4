use anyhow::Context;
use tokio::net::TcpListener;
use todo_server::{AppState, Connector, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    let config = ServerConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_json);

    let connector = Connector::new(config.store_uri.as_str(), config.database.as_str());
    let connection = connector
        .connect()
        .await
        .context("failed to connect to database")?;

    let state = AppState::new(connection.todos(), config.allowed_origin.clone());
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    let addr = listener.local_addr().context("reading bound address")?;
    tracing::info!(
        %addr,
        database = connection.database(),
        "server is running"
    );

    axum::serve(listener, todo_server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;
    Ok(())
}
