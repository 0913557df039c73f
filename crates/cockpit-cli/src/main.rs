mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cockpit_config::{AppConfig, ConfigLoader};
use tracing_subscriber::EnvFilter;

use crate::client::{GatewayClient, build_payload};

#[derive(Parser)]
#[command(
    name = "cockpit",
    version,
    about = "Green Hill cockpit agent gateway"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory holding config.yml / config.toml
    #[arg(long, global = true)]
    config_dir: Option<std::path::PathBuf>,

    /// Gateway address for the query commands (defaults to the configured host/port)
    #[arg(long, global = true)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show health and version of a running gateway
    Status,

    /// List agents available on a running gateway
    Graphs,

    /// Invoke an agent on a running gateway
    Invoke {
        /// Agent identifier
        agent: String,

        /// Text sent as `{"input": <text>}`
        #[arg(long, conflicts_with = "json")]
        input: Option<String>,

        /// Raw JSON request body
        #[arg(long)]
        json: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new()?,
    };
    let config = config_loader.load_with_env()?;

    let directive = log_directive(cli.log_level.as_deref(), &config);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();
    tracing::debug!("config directory: {}", config_loader.config_dir().display());

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }

            let server = cockpit_gateway::GatewayServer::new(config);
            server.run().await?;
        }
        Commands::Status => {
            let client = GatewayClient::new(&gateway_url(cli.url, &config))?;
            let health = client.get("/health").await?;
            let version = client.get("/version").await?;
            println!("health:  {}", serde_json::to_string(&health)?);
            println!("version: {}", serde_json::to_string_pretty(&version)?);
        }
        Commands::Graphs => {
            let client = GatewayClient::new(&gateway_url(cli.url, &config))?;
            let body = client.get("/graphs").await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Invoke { agent, input, json } => {
            let client = GatewayClient::new(&gateway_url(cli.url, &config))?;
            let payload = build_payload(input, json)?;
            let body = client.invoke(&agent, &payload).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn gateway_url(explicit: Option<String>, config: &AppConfig) -> String {
    if let Some(url) = explicit {
        return url;
    }
    let host = match config.gateway.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    format!("http://{}:{}", host, config.gateway.port)
}

/// Filter directive used when RUST_LOG is unset: `--log-level`, then the
/// config file's `log_level`, then `info`.
fn log_directive<'a>(flag: Option<&'a str>, config: &'a AppConfig) -> &'a str {
    flag.or(config.log_level.as_deref())
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or("info")
}
