use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;

use todo_assist::app;
use todo_assist::assistant::Session;
use todo_assist::config::Config;
use todo_assist::repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::init_runtime();

    let config = Config::from_env().context("invalid configuration")?;
    let (store, assistant) = app::build(&config).await?;

    eprintln!("📝 Todo Assist chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let mut session = Session::new(Arc::clone(&assistant));
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = repl::run(&mut session, stdin, stdout) => result.context("terminal I/O failed")?,
        _ = tokio::signal::ctrl_c() => eprintln!(),
    }

    drop(session);
    drop(assistant);
    drop(store);
    info!("Database closed");
    Ok(())
}
