mod config;
mod error;

use std::path::PathBuf;

use clap::Parser;
use runtime::{CohereBackend, ModelAdapter, ServerCommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "tether.toml";

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Chat with an LLM that can call tools from an MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the MCP server (.py, .js, or an executable)
    server: PathBuf,

    /// Extra arguments passed to the server
    #[arg(last = true)]
    server_args: Vec<String>,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether=info,runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!(error = ?e, "fatal");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config)?.with_env();

    let backend = CohereBackend::builder(config.api_key()?, &config.backend.model)
        .endpoint(&config.backend.endpoint)
        .sampling(config.sampling)
        .build();
    info!(backend = %backend, "model backend ready");
    let adapter = ModelAdapter::new(backend).with_timeout(config.model_timeout());

    let server =
        ServerCommand::for_server(&cli.server, &config.tools.interpreters, &cli.server_args);

    println!("tether v{}", env!("CARGO_PKG_VERSION"));
    runtime::session::run(&server, adapter, &config.session_options()).await?;

    println!("\nSession ended.");
    Ok(())
}
