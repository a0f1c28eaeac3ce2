//! Bequest CLI — non-interactive claim tool for beneficiaries.
//!
//! ```bash
//! bequest --config bequest.toml inspect --id 0x<64 hex>
//! bequest --config bequest.toml claim --id 0x<64 hex> \
//!     --address 0x<beneficiary> --key-file beneficiary.key
//! ```
//!
//! The beneficiary private key is read from `--key-file` or the
//! `BEQUEST_BENEFICIARY_KEY` environment variable (32 bytes of hex). Wallet
//! derivation from a mnemonic is deliberately out of scope; export the raw
//! key from your wallet tooling.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bequest_chain::ChainClient;
use bequest_claim::{ClaimRequest, HttpKeyService};
use bequest_core::secp256k1::SecretKey;
use bequest_core::types::{Address, InheritanceId};
use bequest_storage::{HttpGateway, LocatorEncoding};

#[derive(Parser)]
#[command(name = "bequest", version, about = "Claim and decrypt inherited assets")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short, default_value = "bequest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read and print an inheritance record without claiming it
    Inspect {
        /// Inheritance ID (0x-prefixed 64-char hex)
        #[arg(long)]
        id: InheritanceId,
    },

    /// Run the full claim pipeline and write the decrypted asset
    Claim {
        /// Inheritance ID (0x-prefixed 64-char hex)
        #[arg(long)]
        id: InheritanceId,

        /// The caller's chain address, checked against the record
        #[arg(long)]
        address: Address,

        /// File containing the beneficiary private key (32 bytes hex)
        #[arg(long)]
        key_file: Option<PathBuf>,

        /// Proceed even if the record names a different beneficiary
        #[arg(long)]
        override_identity: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = config::Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    config.apply_env_overrides();
    config.validate().context("Configuration validation failed")?;

    let contract: Address = config.chain.contract.parse()?;
    let chain = ChainClient::new(config.endpoints(), contract, config.chain.network)?;

    match cli.command {
        Command::Inspect { id } => inspect(&chain, &id).await,
        Command::Claim {
            id,
            address,
            key_file,
            override_identity,
        } => {
            let secret = load_secret_key(key_file.as_deref())?;
            let request = ClaimRequest {
                inheritance_id: id,
                network: config.chain.network,
                caller: address,
                override_identity,
                output_dir: config.output.directory.clone(),
            };
            let keys = HttpKeyService::new(config.keyservice.base_url.clone());
            let gateway = HttpGateway::new(config.storage.gateway_url.clone());

            run_claim(&chain, &keys, &gateway, &secret, &request).await
        }
    }
}

async fn inspect(chain: &ChainClient, id: &InheritanceId) -> Result<()> {
    let record = chain.read_record(id).await?;

    println!("inheritance:        {id}");
    println!("state:              {}", record.state);
    println!("testator:           {}", record.testator);
    println!("beneficiary:        {}", record.beneficiary);
    println!("grace period:       {}s", record.grace_period_secs);
    match record.scheduled_transfer_time {
        Some(ts) => println!("scheduled transfer: {ts} (unix)"),
        None => println!("scheduled transfer: none"),
    }
    println!("storage locator candidates:");
    for encoding in LocatorEncoding::ORDER {
        println!(
            "  {:<12} {}",
            encoding.as_str(),
            encoding.encode(&record.storage_locator)
        );
    }
    Ok(())
}

async fn run_claim(
    chain: &ChainClient,
    keys: &HttpKeyService,
    gateway: &HttpGateway,
    secret: &SecretKey,
    request: &ClaimRequest,
) -> Result<()> {
    match bequest_claim::claim(chain, keys, gateway, secret, request).await {
        Ok(receipt) => {
            println!(
                "claimed: {} bytes written to {} (locator encoding: {})",
                receipt.bytes_written,
                receipt.path.display(),
                receipt.encoding
            );
            Ok(())
        }
        Err(e) => {
            if e.is_retriable_later() {
                eprintln!("claim failed: {e}");
                eprintln!("hint: the record may not be fully claimable yet; wait and retry");
            } else {
                eprintln!("claim failed: {e}");
            }
            Err(e.into())
        }
    }
}

/// Read the beneficiary private key from a file or the environment.
fn load_secret_key(key_file: Option<&std::path::Path>) -> Result<SecretKey> {
    let hex_key = match key_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file {}", path.display()))?,
        None => std::env::var("BEQUEST_BENEFICIARY_KEY")
            .context("No --key-file given and BEQUEST_BENEFICIARY_KEY is not set")?,
    };

    let trimmed = hex_key.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped).context("Beneficiary key is not valid hex")?;
    SecretKey::from_slice(&bytes).context("Beneficiary key is not a valid secp256k1 key")
}
