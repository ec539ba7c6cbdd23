use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use todo_assist::api::{AppState, api_routes};
use todo_assist::app;
use todo_assist::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::init_runtime();

    let config = Config::from_env().context("invalid configuration")?;
    let (store, assistant) = app::build(&config).await?;

    eprintln!("📝 Todo Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Database: {}", config.database);
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    let router = api_routes(AppState {
        store: Arc::clone(&store),
        assistant,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!(port = config.port, "HTTP server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("server error")?;

    drop(store);
    info!("Database closed");
    Ok(())
}
