//! The classifier capability consumed by the worker pool.

mod lexicon;

pub use lexicon::LexiconClassifier;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Negative,
    Positive,
}

#[derive(Debug, Clone, Error)]
#[error("classification failed: {reason}")]
pub struct ClassifyError {
    reason: String,
}

impl ClassifyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Labels free text.
///
/// Called concurrently from every worker, so implementations must be
/// `Send + Sync` and should not block on I/O. A failure is counted for the
/// record and never aborts the run.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError>;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Sentiment + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        Ok(self(text))
    }
}
