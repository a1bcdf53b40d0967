//! Line-oriented transport over stdin/stdout, for local use.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{BotError, Dispatcher};

/// Default sender id for console messages.
pub const DEFAULT_CONSOLE_SENDER: &str = "console";

pub struct Console {
    sender: String,
    dispatcher: Dispatcher,
}

impl Console {
    pub fn new(dispatcher: Dispatcher, sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            dispatcher,
        }
    }

    /// Reads stdin until EOF, printing each reply.
    pub async fn run(&self) -> Result<(), BotError> {
        tracing::info!("Starting console as {}...", self.sender);
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// One message per input line; replies are followed by a blank line.
    pub async fn serve<R, W>(&self, input: R, mut output: W) -> Result<(), BotError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.dispatcher.handle(&self.sender, &line).await {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n\n").await?;
                output.flush().await?;
            }
        }
        tracing::info!("console input closed");
        Ok(())
    }
}
