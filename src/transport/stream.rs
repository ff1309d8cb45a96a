//! # Transport Streamer
//!
//! Writes an encoded receipt to a [`DeliveryChannel`] in small chunks,
//! strictly one after another. Chunk *n+1* is issued only after chunk *n*
//! completed (with-response) or after the pacing delay elapsed
//! (without-response). Overlapping writes garble the print without any
//! error from the printer.
//!
//! BLE printers typically accept 20-byte writes (default ATT MTU minus
//! header), so that is the default chunk size.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{DeliveryChannel, WriteMode};
use crate::error::TransportError;

/// Default chunk size (bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// Default delay after each write-without-response chunk (milliseconds)
pub const DEFAULT_PACING_MS: u64 = 20;

/// Progress is logged at most every this many bytes.
const LOG_EVERY_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub chunk_size: usize,
    #[serde(with = "millis")]
    pub pacing: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Outcome of one stream.
#[derive(Debug)]
pub enum StreamResult {
    /// Every byte was written.
    Completed(usize),
    /// A write failed; `usize` bytes were written before it.
    Failed(TransportError, usize),
    /// Cancelled between chunks; `usize` bytes were written.
    Cancelled(usize),
}

impl StreamResult {
    pub fn bytes_sent(&self) -> usize {
        match self {
            StreamResult::Completed(n) | StreamResult::Failed(_, n) | StreamResult::Cancelled(n) => *n,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StreamResult::Completed(_))
    }
}

/// Chunked, paced writer.
#[derive(Debug, Clone, Default)]
pub struct Streamer {
    options: StreamOptions,
    cancel: CancellationToken,
}

impl Streamer {
    pub fn new(options: StreamOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop at the next chunk boundary when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Chunk size actually used for `channel`.
    pub fn chunk_size_for(&self, channel: &dyn DeliveryChannel) -> usize {
        let size = self.options.chunk_size.max(1);
        match channel.max_chunk_len() {
            Some(max) if max > 0 => size.min(max),
            _ => size,
        }
    }

    /// Write `bytes` to `channel`, calling `on_progress(sent, total)` after
    /// every chunk.
    pub async fn stream(
        &self,
        channel: &mut dyn DeliveryChannel,
        bytes: &[u8],
        mut on_progress: impl FnMut(usize, usize) + Send,
    ) -> StreamResult {
        let total = bytes.len();
        let chunk_size = self.chunk_size_for(channel);
        let mode = channel.write_mode();
        let mut sent = 0usize;
        let mut next_log = LOG_EVERY_BYTES;

        tracing::info!(
            channel = %channel.describe(),
            total,
            chunk_size,
            ?mode,
            "streaming receipt"
        );

        for chunk in bytes.chunks(chunk_size) {
            if self.cancel.is_cancelled() {
                tracing::info!(sent, total, "stream cancelled");
                return StreamResult::Cancelled(sent);
            }

            if let Err(err) = channel.write_chunk(chunk).await {
                tracing::error!(sent, total, error = %err, "chunk write failed");
                return StreamResult::Failed(err, sent);
            }
            sent += chunk.len();
            on_progress(sent, total);

            if sent >= next_log {
                tracing::debug!(sent, total, "stream progress");
                next_log += LOG_EVERY_BYTES;
            }

            if mode == WriteMode::WithoutResponse && !self.options.pacing.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.pacing) => {}
                    _ = self.cancel.cancelled() => {
                        tracing::info!(sent, total, "stream cancelled during pacing");
                        return StreamResult::Cancelled(sent);
                    }
                }
            }
        }

        tracing::info!(sent, "stream complete");
        StreamResult::Completed(sent)
    }
}
