use std::path::PathBuf;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::config::{DEFAULT_MAX_LINE_BYTES, DEFAULT_READ_CHUNK_BYTES};
use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::pipe::Pipe;

/// Stream newline-delimited lines from a file path.
///
/// Reads the file in fixed-size chunks, reassembles lines that straddle
/// reads, strips the `\n` (and a trailing `\r`) and emits one `Bytes` per
/// line. Nothing is decoded here; malformed content is the parser's problem.
pub struct LineSource {
    path: PathBuf,
    read_chunk_bytes: usize,
    max_line_bytes: usize,
    allow_empty_lines: bool,
}

impl LineSource {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            allow_empty_lines: false,
        }
    }

    /// Number of bytes read per filesystem call.
    pub fn read_chunk_bytes(mut self, n: usize) -> Self {
        self.read_chunk_bytes = n.max(1);
        self
    }

    /// Maximum number of bytes allowed for one line, excluding the newline.
    pub fn max_line_bytes(mut self, n: usize) -> Self {
        self.max_line_bytes = n;
        self
    }

    /// Whether blank lines are dropped instead of emitted.
    pub fn allow_empty_lines(mut self, yes: bool) -> Self {
        self.allow_empty_lines = yes;
        self
    }

    fn too_long(&self, len: usize) -> Error {
        Error::stage(
            "line_source",
            format!(
                "line exceeded max_line_bytes ({} > {}) in {}",
                len,
                self.max_line_bytes,
                self.path.display()
            ),
        )
    }
}

enum EmitOutcome {
    Continue,
    Stop,
}

impl LineSource {
    async fn emit_line(
        &self,
        line: Bytes,
        output: &Sender<Bytes>,
        cancel: &CancelToken,
    ) -> EmitOutcome {
        let line = strip_cr(line);

        if line.is_empty() && self.allow_empty_lines {
            return EmitOutcome::Continue;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = "line_source", where_ = "send", "reviewpipe.cancelled");
                EmitOutcome::Stop
            },
            sent = output.send(line) => {
                if sent.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::INFO, event = "reviewpipe.downstream.closed", stage = "line_source", "reviewpipe.downstream.closed");
                    EmitOutcome::Stop
                } else {
                    EmitOutcome::Continue
                }
            }
        }
    }
}

#[async_trait]
impl Pipe<(), Bytes> for LineSource {
    fn stage_name(&self) -> &'static str {
        "line_source"
    }

    async fn process(
        &self,
        mut input: Receiver<()>,
        output: Sender<Bytes>,
        _buffer: usize,
        cancel: CancelToken,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let stage = self.stage_name();

        tokio::select! {
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = stage, where_ = "start", "reviewpipe.cancelled");
                return Ok(());
            },
            _ = input.recv() => {}
        }

        let mut file = File::open(&self.path).await.map_err(|e| {
            Error::stage(
                "line_source",
                format!("cannot open {}: {}", self.path.display(), e),
            )
        })?;
        let mut read_buf = vec![0_u8; self.read_chunk_bytes];
        let mut pending = BytesMut::new();
        // Bytes of `pending` already known to contain no newline.
        let mut scanned = 0;

        loop {
            let n = tokio::select! {
                _ = cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(tracing::Level::DEBUG, event = "reviewpipe.cancelled", stage = stage, where_ = "read", "reviewpipe.cancelled");
                    return Ok(());
                },
                read = file.read(&mut read_buf) => read?,
            };

            if n == 0 {
                break;
            }
            pending.extend_from_slice(&read_buf[..n]);

            while let Some(offset) = pending[scanned..].iter().position(|&b| b == b'\n') {
                let end = scanned + offset;
                if end > self.max_line_bytes {
                    return Err(self.too_long(end));
                }
                let mut line = pending.split_to(end + 1);
                line.truncate(end);
                scanned = 0;
                if let EmitOutcome::Stop = self.emit_line(line.freeze(), &output, &cancel).await {
                    return Ok(());
                }
            }
            scanned = pending.len();

            if pending.len() > self.max_line_bytes {
                return Err(self.too_long(pending.len()));
            }
        }

        if !pending.is_empty() {
            // Stop and Continue both end the stage.
            let _ = self.emit_line(pending.freeze(), &output, &cancel).await;
        }

        Ok(())
    }
}

fn strip_cr(line: Bytes) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.slice(..line.len() - 1)
    } else {
        line
    }
}
