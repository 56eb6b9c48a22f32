//! Server-Sent Events parsing for streaming chat completions.
//!
//! The API streams `data: {json}` lines separated by blank lines and closes
//! with a `data: [DONE]` sentinel. This wraps the raw byte stream and yields
//! each data payload as it completes, buffering across arbitrary chunk
//! boundaries.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use crate::domain::errors::{ChatError, ChatResult};

const DONE_SENTINEL: &str = "[DONE]";

/// Stream of SSE data payloads parsed from a byte stream.
pub struct SseDataStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: String,
    finished: bool,
}

impl SseDataStream {
    /// Wrap a raw byte stream, e.g. `reqwest::Response::bytes_stream()`.
    pub fn new(byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: String::new(),
            finished: false,
        }
    }

    /// Extract the data payload from one SSE event block, if any.
    fn parse_event(event_text: &str) -> Option<String> {
        for line in event_text.lines() {
            let trimmed = line.trim();

            // Skip blanks and comment lines.
            if trimmed.is_empty() || trimmed.starts_with(':') {
                continue;
            }

            if let Some(data) = trimmed.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    return Some(data.to_string());
                }
            }
        }
        None
    }
}

impl Stream for SseDataStream {
    type Item = ChatResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            // Drain complete events from the buffer first.
            if let Some(event_end) = self.buffer.find("\n\n") {
                let event_text = self.buffer[..event_end].to_string();
                self.buffer.drain(..event_end + 2);

                match Self::parse_event(&event_text) {
                    Some(data) if data == DONE_SENTINEL => {
                        self.finished = true;
                        return Poll::Ready(None);
                    }
                    Some(data) => return Poll::Ready(Some(Ok(data))),
                    None => continue,
                }
            }

            // Need more bytes.
            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Poll::Ready(Some(Err(err))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(ChatError::from(err))));
                }
                Poll::Ready(None) => {
                    self.finished = true;

                    // A trailing event without the final blank line.
                    if !self.buffer.trim().is_empty() {
                        let remaining = std::mem::take(&mut self.buffer);
                        match Self::parse_event(&remaining) {
                            Some(data) if data == DONE_SENTINEL => return Poll::Ready(None),
                            Some(data) => return Poll::Ready(Some(Ok(data))),
                            None => return Poll::Ready(None),
                        }
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
