//! Startup wiring shared by both binaries.

use std::sync::Arc;

use tracing::{debug, info};

use crate::assistant::Assistant;
use crate::config::Config;
use crate::error::Error;
use crate::llm::{TimeoutProvider, create_provider};
use crate::store::{self, TodoStore};
use crate::tools::ToolRegistry;

/// Install the TLS provider and the tracing subscriber.
///
/// Logs go to stderr so the REPL can keep stdout for replies.
pub fn init_runtime() {
    // Another component may already have installed one.
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the store and build the assistant on top of it.
pub async fn build(config: &Config) -> Result<(Arc<dyn TodoStore>, Arc<Assistant>), Error> {
    let store = store::open(&config.database, config.db_timeout).await?;
    info!(database = %config.database, "Database ready");

    let llm = create_provider(&config.llm)?;
    let llm = Arc::new(TimeoutProvider::new(llm, config.llm_timeout));
    info!(
        backend = ?config.llm.backend,
        model = %config.llm.model,
        timeout_secs = config.llm_timeout.as_secs(),
        "LLM provider ready"
    );

    let tools = Arc::new(ToolRegistry::with_todo_tools(Arc::clone(&store)));
    for name in tools.list() {
        if let Some(tool) = tools.get(name) {
            debug!(tool = name, description = tool.description(), "Tool available");
        }
    }
    info!(count = tools.count(), tools = ?tools.list(), "Tools registered");
    let assistant = Arc::new(Assistant::new(
        llm,
        tools,
        config.system_prompt.clone(),
    ));

    Ok((store, assistant))
}
