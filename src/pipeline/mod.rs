//! Stage plumbing and the core ingestion → batching → classification →
//! reduction stages.

pub mod batcher;
pub mod cancel;
pub mod chain;
pub(crate) mod config;
pub mod pipe;
pub mod reducer;
pub mod runtime;
pub mod worker;
