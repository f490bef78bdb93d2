//! SSE parser for the transaction snapshot channel.
//!
//! Converts the raw `reqwest` byte stream of `GET /api/events/:id` into
//! [`Snapshot`] values. Each `snapshot` event carries one full
//! `{value, version}` document. Comment lines (keep-alives) and other
//! event names are skipped.
//!
//! The stream is not restartable: after the first error it yields `None`.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::Stream;
use interval_core::{Snapshot, TransactionState};

use crate::error::{preview, ClientError};

const SNAPSHOT_EVENT: &str = "snapshot";

/// Stream adapter that converts raw SSE bytes into snapshots.
pub struct SnapshotEvents {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: Vec<u8>,
    event: PendingEvent,
    closed: bool,
}

/// Fields of the event currently being read.
#[derive(Default)]
struct PendingEvent {
    name: Option<String>,
    data: Vec<String>,
}

impl PendingEvent {
    fn take(&mut self) -> Option<(String, String)> {
        if self.data.is_empty() {
            self.name = None;
            return None;
        }
        let name = self.name.take().unwrap_or_else(|| "message".to_string());
        let data = std::mem::take(&mut self.data).join("\n");
        Some((name, data))
    }
}

impl SnapshotEvents {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: Vec::new(),
            event: PendingEvent::default(),
            closed: false,
        }
    }

    /// Consume complete lines from the buffer until an event is dispatched.
    fn next_from_buffer(&mut self) -> Option<Result<Snapshot<TransactionState>, ClientError>> {
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    return Some(Err(ClientError::EventStream(format!(
                        "Invalid UTF-8 in stream: {}",
                        e
                    ))))
                }
            };

            if let Some(result) = self.feed_line(line) {
                return Some(result);
            }
        }
        None
    }

    fn feed_line(&mut self, line: &str) -> Option<Result<Snapshot<TransactionState>, ClientError>> {
        // Blank line dispatches the event
        if line.is_empty() {
            let (name, data) = self.event.take()?;
            if name != SNAPSHOT_EVENT {
                tracing::debug!(event = %name, "Skipping unknown event");
                return None;
            }
            return Some(decode_snapshot(&data));
        }

        // Comment (keep-alive)
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event.name = Some(value.to_string()),
            "data" => self.event.data.push(value.to_string()),
            // "id", "retry" and unknown fields are ignored
            _ => {}
        }
        None
    }
}

fn decode_snapshot(data: &str) -> Result<Snapshot<TransactionState>, ClientError> {
    serde_json::from_str(data).map_err(|e| {
        ClientError::Decode(format!(
            "Failed to parse snapshot event: {} (data: {})",
            e,
            preview(data)
        ))
    })
}

impl Stream for SnapshotEvents {
    type Item = Result<Snapshot<TransactionState>, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.closed {
                return Poll::Ready(None);
            }

            if let Some(item) = this.next_from_buffer() {
                if item.is_err() {
                    this.closed = true;
                }
                return Poll::Ready(Some(item));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.closed = true;
                    return Poll::Ready(Some(Err(ClientError::EventStream(e.to_string()))));
                }
                Poll::Ready(None) => {
                    // An event without its trailing blank line is incomplete
                    this.closed = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl std::fmt::Debug for SnapshotEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotEvents")
            .field("buffered", &self.buffer.len())
            .field("closed", &self.closed)
            .finish()
    }
}
