//! Application layer containing the core business logic orchestration.
//!
//! `TransferEngine` is the single write entry point: it validates a request and drives one
//! atomic unit on the backend. `QueryService` serves the paginated read paths.

pub mod engine;
pub mod query;
