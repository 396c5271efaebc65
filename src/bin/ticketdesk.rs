//! # Ticketdesk CLI
//!
//! Command-line front end for the intake engine: parse a raw ticket message,
//! resolve order ids against the configured order-status endpoint, or check
//! the effective configuration.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use ticketdesk_core::config::IntakeConfig;
use ticketdesk_core::logging::init_structured_logging;
use ticketdesk_core::parsing::markup::is_all_digits;
use ticketdesk_core::parsing::parse_raw_message;
use ticketdesk_core::resolution::{resolve_in_waves, BatchResolver};
use tracing::info;

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Parse support-ticket messages and resolve the orders they mention")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a raw message and print the parsed envelope as JSON
    Parse {
        /// Read the message from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Resolve order ids and print the batch result as JSON
    Resolve {
        /// Order ids to resolve
        #[arg(required = true)]
        ids: Vec<String>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load and validate configuration, printing it with secrets masked
    CheckConfig {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_structured_logging();

    match cli.command {
        Commands::Parse { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read stdin")?;
                    buffer
                }
            };
            let parsed = parse_raw_message(&raw);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Commands::Resolve { ids, config } => {
            if let Some(invalid) = ids.iter().find(|id| !is_all_digits(id.trim())) {
                bail!("order id '{invalid}' must contain only digits");
            }
            let config = IntakeConfig::load(config.as_deref())?;
            if config.order_api.base_url.trim().is_empty() {
                bail!("order_api.base_url is not configured (set ORDER_API_BASE_URL or TICKETDESK__ORDER_API__BASE_URL)");
            }
            let resolver = BatchResolver::from_config(&config)?;
            let result = resolve_in_waves(
                &resolver,
                &ids,
                &config.resolver.batch_options(),
                &config.chunking.policy(),
            )
            .await;
            info!(
                found = result.found.len(),
                not_found = result.not_found.len(),
                too_many = result.too_many,
                "Resolution finished"
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::CheckConfig { config } => {
            let config = IntakeConfig::load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config.sanitized_json())?);
            println!("✅ Configuration is valid");
        }
    }

    Ok(())
}
