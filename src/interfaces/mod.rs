//! Transport-side adapters: CSV codecs and the batch driver that feeds the engine.

pub mod batch;
pub mod csv;
