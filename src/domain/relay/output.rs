//! Pull-driven response body for a relay invocation.
//!
//! Upstream is only read while the caller polls for more output, so a slow
//! consumer pauses the upstream connection instead of growing a buffer, and
//! dropping the stream releases the upstream response immediately.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

use super::{extract_delta, ByteStream, DeltaEvent, FrameDecoder};

/// How the output stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Upstream body ended
    Completed,
    /// Upstream connection failed mid-stream; output was truncated silently
    TransportFailure,
    /// Caller went away before the upstream body ended
    Cancelled,
}

impl StreamEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::TransportFailure => "transport_failure",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Counters reported once when a relay stream ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub end: StreamEnd,
    pub fragments: u64,
    pub anomalies: u64,
    pub done_seen: bool,
    pub dropped_bytes: usize,
}

type FinishHook = Box<dyn FnOnce(&StreamSummary) + Send>;

struct Pump {
    upstream: ByteStream,
    decoder: FrameDecoder,
    pending: VecDeque<String>,
    fragments: u64,
    anomalies: u64,
    done_seen: bool,
    on_finish: Option<FinishHook>,
}

impl Pump {
    fn absorb(&mut self, chunk: &[u8]) {
        for line in self.decoder.decode(chunk) {
            match extract_delta(&line) {
                DeltaEvent::Fragment(text) => self.pending.push_back(text),
                DeltaEvent::Done => self.done_seen = true,
                DeltaEvent::Anomaly => self.anomalies += 1,
                DeltaEvent::Ignored => {}
            }
        }
    }

    fn complete(&mut self, end: StreamEnd) {
        let Some(hook) = self.on_finish.take() else {
            return;
        };

        let dropped_bytes = self.decoder.finish();
        if dropped_bytes > 0 {
            debug!(dropped_bytes, "Dropping unterminated trailing line");
        }

        let summary = StreamSummary {
            end,
            fragments: self.fragments,
            anomalies: self.anomalies,
            done_seen: self.done_seen,
            dropped_bytes,
        };

        debug!(
            end = end.as_str(),
            fragments = summary.fragments,
            anomalies = summary.anomalies,
            done_seen = summary.done_seen,
            "Relay stream finished"
        );

        hook(&summary);
    }

    async fn next_fragment(mut self) -> Option<(Result<Bytes, Infallible>, Self)> {
        loop {
            if let Some(text) = self.pending.pop_front() {
                self.fragments += 1;
                return Some((Ok(Bytes::from(text)), self));
            }

            match self.upstream.next().await {
                Some(Ok(chunk)) => self.absorb(&chunk),
                Some(Err(e)) => {
                    warn!(error = %e, fragments = self.fragments, "Upstream stream failed, ending output early");
                    self.complete(StreamEnd::TransportFailure);
                    return None;
                }
                None => {
                    self.complete(StreamEnd::Completed);
                    return None;
                }
            }
        }
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.complete(StreamEnd::Cancelled);
    }
}

/// Ordered stream of extracted text fragments, one item per fragment
pub struct OutputStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, Infallible>> + Send>>,
}

impl OutputStream {
    pub fn new(upstream: ByteStream) -> Self {
        Self::with_finish_hook(upstream, |_| {})
    }

    /// `hook` runs exactly once, when the stream ends or is dropped.
    pub fn with_finish_hook(
        upstream: ByteStream,
        hook: impl FnOnce(&StreamSummary) + Send + 'static,
    ) -> Self {
        let pump = Pump {
            upstream,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
            fragments: 0,
            anomalies: 0,
            done_seen: false,
            on_finish: Some(Box::new(hook)),
        };

        Self {
            inner: Box::pin(stream::unfold(pump, Pump::next_fragment).fuse()),
        }
    }

    /// Drain the whole stream into a string
    pub async fn collect_text(self) -> String {
        self.fold(String::new(), |mut text, item| async move {
            let Ok(bytes) = item;
            text.push_str(&String::from_utf8_lossy(&bytes));
            text
        })
        .await
    }
}

impl Stream for OutputStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream").finish_non_exhaustive()
    }
}
