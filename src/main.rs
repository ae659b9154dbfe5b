mod agent;
mod cli;
mod client;
mod config;
mod groq_client;
mod recommender;
mod server;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::browse::Browser;
use crate::cli::chat::ChatContext;
use crate::config::{default_api_url, AgentConfig, ServerConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Message to send to the assistant
    #[arg(short, long)]
    input: Option<String>,

    /// Base URL of the VibeCheck API
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the recommendation API
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000
        #[arg(short, long)]
        bind: Option<String>,

        /// JSON song dataset
        #[arg(short, long)]
        dataset: Option<String>,

        /// LLM model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Provider label reported in logs
        #[arg(long)]
        provider: Option<String>,
    },

    /// Chat with the music assistant
    Chat {
        /// Message to send to the assistant
        #[arg(short, long)]
        input: Option<String>,

        /// Base URL of the VibeCheck API
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Browse the catalogue and get recommendations
    Browse {
        /// Only list titles containing this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Recommend for this song and exit
        #[arg(short, long)]
        song: Option<String>,

        /// Number of recommendations
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Base URL of the VibeCheck API
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    let dotenv_path = dotenv();

    let cli = Cli::parse();
    let server_config = ServerConfig::from_env();
    init_tracing(&server_config, cli.verbose);

    match dotenv_path {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => warn!(".env file not found; using system environment variables"),
    }

    match cli.command {
        Some(Commands::Serve {
            bind,
            dataset,
            model,
            provider,
        }) => {
            let mut server_config = server_config;
            if let Some(bind) = bind {
                server_config.bind_address = bind;
            }
            if let Some(dataset) = dataset {
                server_config.dataset_path = dataset;
            }
            let agent_config = AgentConfig::resolve(None, provider, model);
            info!(version = env!("CARGO_PKG_VERSION"), "vibecheck starting");
            server::serve(server_config, agent_config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Chat { input, api_url }) => {
            run_chat(input, api_url.unwrap_or_else(default_api_url)).await
        }
        Some(Commands::Browse {
            filter,
            song,
            top_n,
            api_url,
        }) => {
            let mut output = io::stdout();
            let api_url = api_url.unwrap_or_else(default_api_url);
            let Some((client, _)) = cli::connect(&mut output, &api_url).await? else {
                return Ok(ExitCode::FAILURE);
            };
            let mut browser = Browser::new(Box::new(output), client, top_n);
            match song {
                Some(song) => browser.run_once(&song).await,
                None => browser.run(filter.as_deref()).await,
            }
        }
        None => {
            // Default to chat if no subcommand is provided
            run_chat(cli.input, cli.api_url.unwrap_or_else(default_api_url)).await
        }
    }
}

async fn run_chat(input: Option<String>, api_url: String) -> Result<ExitCode> {
    let mut output = io::stdout();
    let Some((client, health)) = cli::connect(&mut output, &api_url).await? else {
        return Ok(ExitCode::FAILURE);
    };

    let mut chat_context = ChatContext::new(
        Box::new(output),
        input,
        true,
        client,
        health.agent_ready,
    );
    chat_context.run().await
}

/// `RUST_LOG` wins, then `VIBECHECK_LOG`; `--verbose` turns on debug output.
fn init_tracing(config: &ServerConfig, verbose: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => config.log_level.parse().unwrap_or_else(|e| {
            eprintln!(
                "WARN: VIBECHECK_LOG='{}' is not a valid tracing filter ({}); falling back to 'info'",
                config.log_level, e
            );
            EnvFilter::new("info")
        }),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr);

    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
