//! The destination contract and adapters for common sink shapes.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A destination that accepts delivered byte buffers, one at a time.
///
/// The worker owns the sink exclusively for the writer's lifetime, so `write`
/// takes `&mut self`. A delivery either fully succeeds or reports an error;
/// the queued writer makes no other assumptions (no buffering, no flushing).
#[async_trait]
pub trait Sink: Send {
    /// Writes one buffer to the destination.
    async fn write(&mut self, buf: Bytes) -> io::Result<()>;
}

/// A function that implements the [`Sink`] trait.
pub struct SinkFn<F>(pub F);

#[async_trait]
impl<F> Sink for SinkFn<F>
where
    F: FnMut(Bytes) -> io::Result<()> + Send,
{
    async fn write(&mut self, buf: Bytes) -> io::Result<()> {
        (self.0)(buf)
    }
}

/// A [`Sink`] that discards all delivered buffers.
pub struct Discard;

#[async_trait]
impl Sink for Discard {
    async fn write(&mut self, _buf: Bytes) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps an [`AsyncWrite`] to provide a [`Sink`] interface.
///
/// Each buffer is written in full before the delivery is considered done.
pub struct IoSink<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin + Send> IoSink<W> {
    /// Creates a sink adapter around an async writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Sink for IoSink<W> {
    async fn write(&mut self, buf: Bytes) -> io::Result<()> {
        self.inner.write_all(&buf).await
    }
}
