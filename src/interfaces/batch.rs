use crate::application::engine::TransferEngine;
use crate::domain::payment::TransferRequest;
use crate::domain::ports::{BackendHandle, LedgerBackend};
use crate::error::{Result, StoreError, TransferError};
use crate::interfaces::csv::account_reader::AccountReader;
use crate::interfaces::csv::transfer_reader::TransferReader;
use crate::telemetry;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Tally of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub committed: usize,
    /// Refused by validation (unknown account, low balance, ...).
    pub rejected: usize,
    /// Timed out or hit a store failure.
    pub failed: usize,
    /// Rows that could not be decoded.
    pub malformed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &std::result::Result<(), TransferError>) {
        match outcome {
            Ok(()) => self.committed += 1,
            Err(e) if e.is_validation() => self.rejected += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Opens every account in `reader`. Ids already present are kept as they are.
///
/// Returns the number of accounts created.
pub async fn seed_accounts<R: Read>(
    backend: &BackendHandle,
    reader: AccountReader<R>,
) -> Result<usize> {
    let mut created = 0;
    for row in reader.accounts() {
        match row {
            Ok(account) => match backend.open_account(account).await {
                Ok(()) => created += 1,
                Err(StoreError::DuplicateAccount(id)) => {
                    warn!(account = %id, "account already exists, keeping stored state");
                }
                Err(e) => return Err(e.into()),
            },
            Err(e) => eprintln!("Error reading account: {}", e),
        }
    }
    info!(created, "accounts seeded");
    Ok(created)
}

/// Feeds decoded transfer requests to the engine.
///
/// This is the transport boundary: every request is bracketed by the telemetry events
/// and failures are reported with their client-facing code. With `concurrency > 1`
/// requests run as parallel tasks, at most `concurrency` in flight.
pub struct BatchRunner {
    engine: TransferEngine,
    timeout: Duration,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(engine: TransferEngine, timeout: Duration) -> Self {
        Self {
            engine,
            timeout,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run<R: Read>(&self, reader: TransferReader<R>) -> BatchReport {
        if self.concurrency == 1 {
            self.run_sequential(reader).await
        } else {
            self.run_parallel(reader).await
        }
    }

    async fn run_sequential<R: Read>(&self, reader: TransferReader<R>) -> BatchReport {
        let mut report = BatchReport::default();
        for row in reader.requests() {
            match row {
                Ok(request) => {
                    let outcome = handle(&self.engine, &request, self.timeout).await;
                    report.record(&outcome);
                }
                Err(e) => {
                    eprintln!("Error reading transfer: {}", e);
                    report.malformed += 1;
                }
            }
        }
        report
    }

    async fn run_parallel<R: Read>(&self, reader: TransferReader<R>) -> BatchReport {
        let mut report = BatchReport::default();
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for row in reader.requests() {
            let request = match row {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("Error reading transfer: {}", e);
                    report.malformed += 1;
                    continue;
                }
            };
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let engine = self.engine.clone();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let outcome = handle(&engine, &request, timeout).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    warn!(error = %e, "transfer task panicked");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

async fn handle(
    engine: &TransferEngine,
    request: &TransferRequest,
    timeout: Duration,
) -> std::result::Result<(), TransferError> {
    telemetry::transfer_requested(request);
    let started = Instant::now();
    let outcome = engine.submit(request, timeout).await;
    telemetry::transfer_finished(request, &outcome, started.elapsed());
    if let Err(e) = &outcome {
        eprintln!(
            "Error processing transfer {} -> {}: [{}] {}",
            request.from,
            request.to,
            e.code(),
            e.client_message()
        );
    }
    outcome
}
