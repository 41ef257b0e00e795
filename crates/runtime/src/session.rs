//! Interactive session driver.

use crate::engine::{DEFAULT_MAX_TOOL_ROUNDS, Engine, RoundOutcome};
use crate::model::{Backend, ModelAdapter, ToolDeclaration};
use crate::tools::{McpToolHost, ServerCommand, ToolHost};
use crate::Result;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Typing this at the prompt (any case) ends the session.
pub const QUIT_COMMAND: &str = "quit";

const PROMPT: &str = "\nQuery: ";

/// Connection and loop settings for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub connect_timeout: Duration,
    pub call_timeout: Duration,
    pub max_tool_rounds: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: crate::tools::DEFAULT_CONNECT_TIMEOUT,
            call_timeout: crate::tools::DEFAULT_CALL_TIMEOUT,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// A connected tool host, its discovered tools and a model.
pub struct Session<B, H> {
    adapter: ModelAdapter<B>,
    host: H,
    tools: Vec<ToolDeclaration>,
    max_tool_rounds: usize,
}

impl<B: Backend, H: ToolHost> Session<B, H> {
    /// Discover tools and create the session.
    ///
    /// On failure the host is shut down before the error is returned.
    pub async fn start(adapter: ModelAdapter<B>, host: H) -> Result<Self> {
        let tools = match host.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                host.shutdown().await;
                return Err(e.into());
            }
        };
        info!(tools = tools.len(), "tool discovery complete");

        Ok(Self {
            adapter,
            host,
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        })
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// The tool declarations discovered at start.
    pub fn tools(&self) -> &[ToolDeclaration] {
        &self.tools
    }

    /// Resolve one query.
    pub async fn run_round(&self, query: &str) -> RoundOutcome {
        Engine::new(&self.adapter, &self.host, &self.tools)
            .with_max_tool_rounds(self.max_tool_rounds)
            .run_round(query)
            .await
    }

    /// Run the read loop until `quit` or end of input, then release the host.
    ///
    /// A failed round or an undecodable input line is reported and the loop
    /// continues. Only I/O errors on `input` or `output` end the loop early;
    /// the host is released either way.
    pub async fn run<R, W>(self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = self.repl(input, &mut output).await;
        self.host.shutdown().await;
        result
    }

    async fn repl<R, W>(&self, mut input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        output
            .write_all(format!("\nConnected to server with tools: {names:?}\n").as_bytes())
            .await?;
        output
            .write_all(format!("Type your queries or '{QUIT_COMMAND}' to exit.\n").as_bytes())
            .await?;

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let mut buf = Vec::new();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(bytes = buf.len(), "discarding input line that is not valid UTF-8");
                output.write_all(b"\nError: input is not valid UTF-8\n").await?;
                continue;
            };

            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if query.eq_ignore_ascii_case(QUIT_COMMAND) {
                break;
            }

            let reply = match self.run_round(query).await {
                RoundOutcome::Answered(resolution) => format!("\n{}\n", resolution.text),
                RoundOutcome::Failed(e) => {
                    error!(error = ?e, "round failed");
                    format!("\nError: {e}\n")
                }
            };
            output.write_all(reply.as_bytes()).await?;
        }

        output.flush().await?;
        Ok(())
    }
}

/// Launch the tool server, then run an interactive session on stdin/stdout.
///
/// Connection failures are returned before any prompt is shown.
pub async fn run<B: Backend>(
    server: &ServerCommand,
    adapter: ModelAdapter<B>,
    options: &SessionOptions,
) -> Result<()> {
    let host = McpToolHost::connect(server, options.connect_timeout)
        .await?
        .with_call_timeout(options.call_timeout);

    let session = Session::start(adapter, host)
        .await?
        .with_max_tool_rounds(options.max_tool_rounds);

    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}
