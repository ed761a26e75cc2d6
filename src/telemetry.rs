//! Logging setup and the structured events emitted around each transfer.

use crate::domain::payment::TransferRequest;
use crate::error::TransferError;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. Output goes to stderr so stdout stays machine-readable.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice is a no-op.
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        let layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_ansi(false);
        registry.with(layer).try_init()
    } else {
        let layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        warn!("logging already initialised");
    }
}

/// Emitted by a transport before handing a request to the engine.
pub fn transfer_requested(request: &TransferRequest) {
    info!(
        event = "transfer.requested",
        from = %request.from,
        to = %request.to,
        amount = %request.amount,
        "transfer requested"
    );
}

/// Emitted by a transport once the engine has answered.
pub fn transfer_finished(
    request: &TransferRequest,
    outcome: &Result<(), TransferError>,
    elapsed: Duration,
) {
    let elapsed_us = elapsed.as_micros() as u64;
    match outcome {
        Ok(()) => info!(
            event = "transfer.completed",
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            elapsed_us,
            "transfer completed"
        ),
        Err(e) if e.is_validation() => info!(
            event = "transfer.rejected",
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            code = e.code(),
            elapsed_us,
            "transfer rejected"
        ),
        Err(e) => warn!(
            event = "transfer.failed",
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            code = e.code(),
            error = %e,
            elapsed_us,
            "transfer failed"
        ),
    }
}
