//! Read pacing for simulated slow uploads.

use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Sleep;

/// Number of chunks a transfer is divided into, regardless of its size.
pub const CHUNK_COUNT: usize = 100;

/// Paces reads over an in-memory buffer so that draining it takes roughly a
/// target wall-clock duration.
///
/// Every read completion is preceded by one inter-chunk delay, the terminal
/// zero-byte read included, so a full drain costs about one delay more than
/// the target. Buffers smaller than [`CHUNK_COUNT`] bytes clamp the chunk
/// size to a single byte; each byte then pays a full hundredth of the
/// target, so the drain time tracks the byte count instead of the target.
pub struct ThrottledReader {
    data: Bytes,
    pos: usize,
    bytes_per_chunk: usize,
    delay: Duration,
    pending: Option<Pending>,
}

struct Pending {
    sleep: Pin<Box<Sleep>>,
    end: usize,
}

impl ThrottledReader {
    pub fn new(data: Bytes, duration: Duration) -> Self {
        let bytes_per_chunk = std::cmp::max(1, data.len() / CHUNK_COUNT);
        let delay = duration / CHUNK_COUNT as u32;
        Self { data, pos: 0, bytes_per_chunk, delay, pending: None }
    }

    /// Upper bound on the bytes a single read delivers. Callers streaming
    /// this reader should use buffers at least this large, or every partial
    /// delivery pays the full inter-chunk delay again.
    pub fn bytes_per_chunk(&self) -> usize {
        self.bytes_per_chunk
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl AsyncRead for ThrottledReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        loop {
            if let Some(pending) = this.pending.as_mut() {
                ready!(pending.sleep.as_mut().poll(cx));
                let end = pending.end;
                this.pending = None;
                let n = (end - this.pos).min(buf.remaining());
                buf.put_slice(&this.data[this.pos..this.pos + n]);
                this.pos += n;
                return Poll::Ready(Ok(()));
            }
            let end = (this.pos + this.bytes_per_chunk).min(this.data.len());
            this.pending = Some(Pending {
                sleep: Box::pin(tokio::time::sleep(this.delay)),
                end,
            });
        }
    }
}
