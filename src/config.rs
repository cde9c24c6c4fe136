//! Pipeline tunables.

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_NUM_WORKERS: usize = 10;
pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_STAGE_BUFFER: usize = 128;
pub const DEFAULT_READ_CHUNK_BYTES: usize = 8 * 1024;
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Sizing of the pipeline.
///
/// None of these values change the statistics a run produces, only how much
/// work runs in parallel and how much memory is in flight. The work queue
/// holds at most `queue_capacity * chunk_size` records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Concurrent classification workers.
    pub num_workers: usize,
    /// Records per batch.
    pub chunk_size: usize,
    /// Batches the work queue holds before the batcher blocks.
    pub queue_capacity: usize,
    /// Capacity of the line and record channels ahead of the batcher.
    pub stage_buffer: usize,
    /// Bytes requested per file read.
    pub read_chunk_bytes: usize,
    /// Longest accepted input line.
    pub max_line_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            stage_buffer: DEFAULT_STAGE_BUFFER,
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl PipelineConfig {
    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    pub fn with_queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    pub fn with_stage_buffer(mut self, n: usize) -> Self {
        self.stage_buffer = n;
        self
    }

    pub fn with_read_chunk_bytes(mut self, n: usize) -> Self {
        self.read_chunk_bytes = n;
        self
    }

    pub fn with_max_line_bytes(mut self, n: usize) -> Self {
        self.max_line_bytes = n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("num_workers", self.num_workers),
            ("chunk_size", self.chunk_size),
            ("queue_capacity", self.queue_capacity),
            ("stage_buffer", self.stage_buffer),
            ("read_chunk_bytes", self.read_chunk_bytes),
            ("max_line_bytes", self.max_line_bytes),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(Error::config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}
