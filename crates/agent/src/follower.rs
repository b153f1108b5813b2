//! Append-only log follower.
//!
//! [`LogFollower`] tails the client log from a persisted cursor and sends
//! complete records downstream. It never busy-polls: when no new bytes
//! are available it sleeps for a bounded interval and tries again.
//!
//! Lifecycle: `Idle -> Tailing -> (Paused on truncation) -> Tailing ->
//! Stopped`. A truncated or rotated stream (length below the cursor) is
//! reported explicitly as a [`FollowerItem::Discontinuity`] before any
//! record is re-emitted from offset 0 -- never a silent re-read.
//!
//! Cancellation is cooperative: the token is observed between records and
//! during idle sleeps, so `stop()` never interrupts a record mid-flight.
//! After each record the cursor is persisted as exactly the first byte of
//! the next unconsumed record, which is what makes a restart resume
//! without re-emitting or skipping anything.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arenatrack_core::log::record::{RawRecord, RecordAssembler};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::cursor::{CursorError, CursorStore};

/// Items produced by the follower, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerItem {
    /// One complete record.
    Record(RawRecord),
    /// The stream shrank below the cursor; reading restarts at offset 0.
    Discontinuity {
        previous_offset: u64,
        stream_len: u64,
    },
}

/// Follower lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerState {
    Idle,
    Tailing,
    Paused,
    Stopped,
}

/// Fatal follower errors. I/O hiccups on the followed file are retried
/// with the poll interval; only unusable cursor storage (and a closed
/// output channel) end the task.
#[derive(Debug, thiserror::Error)]
pub enum FollowerError {
    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("follower output channel closed")]
    ChannelClosed,
}

pub struct LogFollower {
    path: PathBuf,
    stream_id: String,
    store: Arc<dyn CursorStore>,
    poll_interval: Duration,
    cancel: CancellationToken,
    state: watch::Sender<FollowerState>,
}

impl LogFollower {
    pub fn new(path: impl Into<PathBuf>, store: Arc<dyn CursorStore>, poll_interval: Duration) -> Self {
        let path = path.into();
        let stream_id = path.to_string_lossy().into_owned();
        Self {
            path,
            stream_id,
            store,
            poll_interval,
            cancel: CancellationToken::new(),
            state: watch::Sender::new(FollowerState::Idle),
        }
    }

    /// Token that stops the follower after the record currently being
    /// processed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Identity under which this stream's cursor is persisted.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Watch the follower's lifecycle state.
    pub fn state(&self) -> watch::Receiver<FollowerState> {
        self.state.subscribe()
    }

    /// Tail the stream until cancelled, sending items through `tx`.
    pub async fn run(self, tx: mpsc::Sender<FollowerItem>) -> Result<(), FollowerError> {
        let mut file_pos = self.store.load(&self.stream_id).await?.unwrap_or(0);
        let mut assembler = RecordAssembler::new();
        // Bytes read from the file but not yet terminated by a newline.
        let mut carry: Vec<u8> = Vec::new();

        self.state.send_replace(FollowerState::Tailing);
        tracing::info!(stream = %self.stream_id, offset = file_pos, "Follower tailing");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let stream_len = match tokio::fs::metadata(&self.path).await {
                Ok(metadata) => metadata.len(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // The client has not created the log yet.
                    self.idle().await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to stat log file; retrying");
                    self.idle().await;
                    continue;
                }
            };

            if stream_len < file_pos {
                self.state.send_replace(FollowerState::Paused);
                tracing::warn!(
                    stream = %self.stream_id,
                    previous_offset = file_pos,
                    stream_len,
                    "Log truncated or rotated; resetting to offset 0"
                );
                tx.send(FollowerItem::Discontinuity {
                    previous_offset: file_pos,
                    stream_len,
                })
                .await
                .map_err(|_| FollowerError::ChannelClosed)?;
                self.store.store(&self.stream_id, 0).await?;
                file_pos = 0;
                carry.clear();
                assembler.reset();
                self.state.send_replace(FollowerState::Tailing);
                continue;
            }

            if stream_len == file_pos {
                self.idle().await;
                continue;
            }

            let chunk = match self.read_chunk(file_pos, stream_len - file_pos).await {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read log file; retrying");
                    self.idle().await;
                    continue;
                }
            };
            if chunk.is_empty() {
                self.idle().await;
                continue;
            }
            file_pos += chunk.len() as u64;
            carry.extend_from_slice(&chunk);

            // Hand complete lines to the assembler; a trailing partial
            // line stays in `carry` until its newline arrives.
            let mut line_start = file_pos - carry.len() as u64;
            while let Some(newline) = carry.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = carry.drain(..=newline).collect();
                let next_offset = line_start + line_bytes.len() as u64;
                let line = String::from_utf8_lossy(&line_bytes);
                let line = line.trim_end_matches(['\n', '\r']);

                for record in assembler.push_line(line_start, line, next_offset) {
                    let cursor = record.next_offset;
                    tx.send(FollowerItem::Record(record))
                        .await
                        .map_err(|_| FollowerError::ChannelClosed)?;
                    self.store.store(&self.stream_id, cursor).await?;

                    if self.cancel.is_cancelled() {
                        self.state.send_replace(FollowerState::Stopped);
                        tracing::info!(stream = %self.stream_id, cursor, "Follower stopped");
                        return Ok(());
                    }
                }
                line_start = next_offset;
            }
        }

        self.state.send_replace(FollowerState::Stopped);
        tracing::info!(stream = %self.stream_id, "Follower stopped");
        Ok(())
    }

    /// Bounded sleep, woken early by cancellation.
    async fn idle(&self) {
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(self.poll_interval) => {}
        }
    }

    /// Read `len` bytes starting at `from`. The file is reopened per read
    /// so a rotated file never pins a stale handle.
    async fn read_chunk(&self, from: u64, len: u64) -> std::io::Result<Vec<u8>> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(from)).await?;
        let mut buf = vec![0u8; len as usize];
        let mut filled = 0;
        while filled < buf.len() {
            let n = file.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }
}
