//! Bitcoin transaction API CLI
//!
//! ```sh
//! # Run the API server with the default config (~/.config/btc-tx-service/config.toml)
//! tx-api serve
//!
//! # Custom config, port override, validate only
//! tx-api serve --config /etc/btc-tx-service/config.toml --port 8080 --check
//!
//! # Query a running server
//! tx-api fetch list --limit 10
//! tx-api fetch by-time "1 hour" --limit 24
//! tx-api --url http://explorer:3001 fetch get <hash>
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use btc_tx::config::{AppConfig, ConfigError};
use btc_tx::server::{init_tracing, ServerHandle, ServerOptions};
use tx_api_client::{PageRequest, TransactionApiClient};

#[derive(Parser, Debug)]
#[command(
    name = "tx-api",
    version,
    about = "Paginated read API over a TimescaleDB table of Bitcoin transactions",
    long_about = "Serve the Bitcoin transaction API, or query a running instance.\n\n\
                  Default config: ~/.config/btc-tx-service/config.toml"
)]
struct Cli {
    /// Base URL of the API, for `fetch`.
    #[arg(long, global = true, env = "TX_API_URL", default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Query a running server and print the JSON result.
    #[command(subcommand)]
    Fetch(FetchCommand),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TX_API_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[derive(Subcommand, Debug)]
enum FetchCommand {
    /// Newest transactions, paginated.
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Transactions between two days (YYYY-MM-DD), inclusive.
    Range {
        start: NaiveDate,
        end: NaiveDate,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Aggregates per time bucket, e.g. "1 hour".
    ByTime {
        interval: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Transactions whose hash contains TERM (case-insensitive).
    Search {
        term: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// A single transaction by hash.
    Get { hash: String },
    /// Server health.
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => match serve(args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Fetch(query) => {
            init_fetch_tracing();
            match fetch(&cli.url, query).await {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

// ── serve ──────────────────────────────────────────────────────────

/// A missing file means defaults; any other load failure is fatal.
fn load_config(path: &Path) -> Result<(AppConfig, bool), ConfigError> {
    match AppConfig::load(path) {
        Ok(cfg) => Ok((cfg, true)),
        Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            Ok((cfg, false))
        }
        Err(e) => Err(e),
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args.config.unwrap_or_else(btc_tx::default_config_path);

    let (mut config, from_file) = load_config(&config_path)?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    if from_file {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!(
            "Config file {} not found, using defaults",
            config_path.display()
        );
    }

    if let Some(port) = args.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    config.validate()?;

    if args.check {
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.redacted_url());
        println!(
            "   Rate limit  : {}",
            if config.rate_limit.enabled {
                format!(
                    "{} requests / {}s",
                    config.rate_limit.max_requests, config.rate_limit.window_secs
                )
            } else {
                "disabled".to_string()
            }
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !args.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;
    Ok(())
}

// ── fetch ──────────────────────────────────────────────────────────

fn init_fetch_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn page(limit: Option<u32>, offset: Option<u64>) -> PageRequest {
    PageRequest { limit, offset }
}

async fn fetch(
    url: &str,
    query: FetchCommand,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = TransactionApiClient::new(url)?;

    match query {
        FetchCommand::List { limit, offset } => {
            print_json(&client.list(page(limit, offset)).await?)?;
        }
        FetchCommand::Range {
            start,
            end,
            limit,
            offset,
        } => {
            print_json(&client.range(start, end, page(limit, offset)).await?)?;
        }
        FetchCommand::ByTime { interval, limit } => {
            print_json(&client.by_time(&interval, limit).await?)?;
        }
        FetchCommand::Search { term, limit } => {
            print_json(&client.search(&term, limit).await?)?;
        }
        FetchCommand::Get { hash } => match client.get_transaction(&hash).await? {
            Some(tx) => print_json(&tx)?,
            None => {
                eprintln!("Transaction {} not found", hash);
                return Ok(ExitCode::from(2));
            }
        },
        FetchCommand::Health => {
            let health = client.health().await?;
            print_json(&health)?;
            if health.status != "ok" {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
