//! Interactive loop — one line in, one assistant reply out.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::assistant::Session;

/// Prefix for every assistant reply on stdout.
pub const REPLY_MARKER: &str = "🤖: ";

/// Read lines from `input` until EOF or `/quit`, answering each through
/// `session` and writing the reply to `output`.
///
/// A failed turn is reported on stderr and the loop carries on.
pub async fn run<R, W>(session: &mut Session, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        match session.send(line).await {
            Ok(reply) => {
                output
                    .write_all(format!("{REPLY_MARKER}{}\n", reply.message).as_bytes())
                    .await?;
                output.flush().await?;
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Turn failed");
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(())
}
