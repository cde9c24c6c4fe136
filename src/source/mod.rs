//! Input sources.

#[cfg(feature = "fetch")]
pub mod fetch;
pub mod lines;
