pub mod account_reader;
pub mod ledger_writer;
pub mod transfer_reader;
