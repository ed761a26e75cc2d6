//! Domain model: money and identifier types, accounts, payment entries, and the store
//! ports the transfer engine depends on.

pub mod account;
pub mod payment;
pub mod ports;
