use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wallet_ledger::application::engine::TransferEngine;
use wallet_ledger::application::query::QueryService;
use wallet_ledger::config::AppConfig;
use wallet_ledger::domain::ports::BackendHandle;
use wallet_ledger::infrastructure::in_memory::InMemoryBackend;
use wallet_ledger::interfaces::batch::{BatchRunner, seed_accounts};
use wallet_ledger::interfaces::csv::account_reader::AccountReader;
use wallet_ledger::interfaces::csv::ledger_writer::LedgerWriter;
use wallet_ledger::interfaces::csv::transfer_reader::TransferReader;
use wallet_ledger::telemetry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accounts CSV file (id, balance, currency) used to seed the ledger
    accounts: PathBuf,

    /// Transfers CSV file (from, to, amount)
    transfers: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Deadline for each transfer in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log filter, e.g. "debug" or "wallet_ledger=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Number of transfers processed concurrently
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Also write the payment ledger as CSV to this file
    #[arg(long)]
    payments_out: Option<PathBuf>,
}

fn open_backend(db_path: Option<PathBuf>) -> Result<BackendHandle> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use wallet_ledger::infrastructure::rocksdb::RocksDBBackend;
            let backend = RocksDBBackend::open(path).into_diagnostic()?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryBackend::new()))
        }
        None => Ok(Arc::new(InMemoryBackend::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    if let Some(db_path) = cli.db_path {
        config.db_path = Some(db_path);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.transfer_timeout_ms = timeout_ms;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate().into_diagnostic()?;

    telemetry::init_logging(&config.log_level, config.log_json);

    let backend = open_backend(config.db_path.clone())?;

    let accounts = File::open(&cli.accounts).into_diagnostic()?;
    seed_accounts(&backend, AccountReader::new(accounts))
        .await
        .into_diagnostic()?;

    // Process transfers
    let engine = TransferEngine::new(Arc::clone(&backend));
    let runner =
        BatchRunner::new(engine, config.transfer_timeout()).with_concurrency(cli.concurrency);
    let transfers = File::open(&cli.transfers).into_diagnostic()?;
    let report = runner.run(TransferReader::new(transfers)).await;
    info!(
        committed = report.committed,
        rejected = report.rejected,
        failed = report.failed,
        malformed = report.malformed,
        "batch finished"
    );

    // Output final state
    let query = QueryService::with_default_limit(backend, config.default_page_limit);
    let accounts = query.all_accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    if let Some(path) = cli.payments_out {
        let payments = query.all_payments().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        LedgerWriter::new(file)
            .write_payments(payments)
            .into_diagnostic()?;
    }

    Ok(())
}
