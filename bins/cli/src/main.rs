//! ledgersync command-line front end.
//!
//! Usage:
//!   ledgersync accounts --input FILE [--api VERSION]      - Print the account tree
//!   ledgersync transactions --input FILE [--api VERSION]  - Print transactions
//!   ledgersync reencode --input FILE [--api VERSION]      - Re-encode for posting

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgersync_core::model::{AccountTree, FormatContext, Transaction, TransactionStatus};
use ledgersync_core::protocol;
use ledgersync_shared::types::ApiVersion;
use ledgersync_shared::{AppConfig, AppError};

#[derive(Parser, Debug)]
#[command(name = "ledgersync", version, about = "Decode plain-text accounting server payloads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the account tree with per-currency totals
    Accounts(InputArgs),
    /// Print transactions with their postings
    Transactions(InputArgs),
    /// Re-encode transactions as posting bodies for the newest server revision
    Reencode(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON payload as returned by the server
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// API revision of the payload; defaults to the configured profile
    #[arg(long = "api")]
    api: Option<ApiVersion>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().map_err(AppError::from)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = FormatContext::from(&config.profile);
    let capacity = config.sync.channel_capacity;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Accounts(args) => {
            let version = args.api.unwrap_or(config.profile.api_version);
            let bytes = read_input(&args).await?;
            let stream = protocol::stream_accounts(bytes, version, capacity, cancel)
                .map_err(AppError::from)?;
            let tree = protocol::collect_tree(stream).await.map_err(AppError::from)?;
            print_tree(&tree, &ctx);
        }
        Command::Transactions(args) => {
            let version = args.api.unwrap_or(config.profile.api_version);
            let bytes = read_input(&args).await?;
            let mut stream = protocol::stream_transactions(bytes, version, capacity, cancel)
                .map_err(AppError::from)?;
            let mut count = 0usize;
            while let Some(record) = stream.next().await {
                print_transaction(&record.map_err(AppError::from)?, &ctx);
                count += 1;
            }
            info!(transactions = count, "done");
        }
        Command::Reencode(args) => {
            let version = args.api.unwrap_or(config.profile.api_version);
            let bytes = read_input(&args).await?;
            let stream = protocol::stream_transactions(bytes, version, capacity, cancel)
                .map_err(AppError::from)?;
            let transactions = protocol::collect_transactions(stream)
                .await
                .map_err(AppError::from)?;
            for transaction in &transactions {
                let body = protocol::encode_transaction(transaction, ApiVersion::latest(), &ctx)
                    .map_err(AppError::from)?;
                println!("{}", String::from_utf8(body).context("encoded body is not UTF-8")?);
            }
        }
    }

    Ok(())
}

async fn read_input(args: &InputArgs) -> anyhow::Result<Vec<u8>> {
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!(path = %args.input.display(), bytes = bytes.len(), "payload loaded");
    Ok(bytes)
}

fn print_tree(tree: &AccountTree, ctx: &FormatContext) {
    for node in tree.iter() {
        let amounts: Vec<String> = node.styled_amounts().map(|a| a.format(ctx)).collect();
        println!(
            "{:indent$}{}  {}",
            "",
            node.short_name(),
            amounts.join(", "),
            indent = node.level() * 2
        );
    }
}

fn print_transaction(transaction: &Transaction, ctx: &FormatContext) {
    let mark = match transaction.status {
        TransactionStatus::Unmarked => "",
        TransactionStatus::Pending => " !",
        TransactionStatus::Cleared => " *",
    };
    println!("{}{mark} {}", transaction.date, transaction.description);
    for posting in &transaction.postings {
        let amount = posting
            .styled_amount()
            .map(|a| a.format(ctx))
            .unwrap_or_default();
        println!("    {:<40}  {amount}", posting.account_name);
    }
    println!();
}
