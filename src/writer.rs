//! The queued writer: a bounded buffer queue drained by a background task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::error::WriteError;
use crate::sink::Sink;

/// Default capacity of the pending-buffer queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// State published by the worker and read by producers.
struct Shared {
    /// First error wins; once set it stays for the writer's lifetime.
    error: OnceCell<WriteError>,
    done: AtomicBool,
}

impl Shared {
    fn latch(&self, err: WriteError) {
        let _ = self.error.set(err);
    }
}

/// An order-preserving writer that queues buffers for a background task to
/// deliver to a [`Sink`].
///
/// Producers hand buffers to [`write`](Self::write) without waiting on the
/// sink's I/O latency; a single worker task drains the queue in arrival
/// order. The queue is bounded, so a full queue suspends writers until the
/// worker catches up. Sink failures and cancellation are latched and
/// reported to every subsequent call.
///
/// Once the worker has exited (closure, sink failure, or cancellation) the
/// writer is terminal: discard it and build a new one.
pub struct QueuedWriter {
    cancel: CancellationToken,
    /// Fired by `close` so writers suspended on a full queue return promptly.
    closed: CancellationToken,
    tx: Mutex<Option<mpsc::Sender<Bytes>>>,
    shared: Arc<Shared>,
}

/// Configures and spawns a [`QueuedWriter`].
pub struct Builder<S> {
    sink: S,
    cancel: Option<CancellationToken>,
    capacity: usize,
    tracker: Option<TaskTracker>,
}

impl<S: Sink + 'static> Builder<S> {
    /// Sets the cancellation token observed by writes and the worker.
    ///
    /// Without one, the writer uses a fresh token that never fires.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sets the queue capacity. Defaults to [`DEFAULT_QUEUE_CAPACITY`].
    pub fn capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        self.capacity = capacity;
        self
    }

    /// Runs the worker on the given tracker, so the owner can await full
    /// drain with [`TaskTracker::wait`] instead of polling
    /// [`done`](QueuedWriter::done).
    pub fn tracker(mut self, tracker: &TaskTracker) -> Self {
        self.tracker = Some(tracker.clone());
        self
    }

    /// Allocates the queue and starts the worker task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> QueuedWriter {
        let cancel = self.cancel.unwrap_or_else(CancellationToken::new);
        let (tx, rx) = mpsc::channel(self.capacity);
        let shared = Arc::new(Shared {
            error: OnceCell::new(),
            done: AtomicBool::new(false),
        });

        let worker = run(self.sink, rx, cancel.clone(), shared.clone());
        match &self.tracker {
            Some(tracker) => {
                tracker.spawn(worker);
            }
            None => {
                tokio::spawn(worker);
            }
        }

        QueuedWriter {
            cancel,
            closed: CancellationToken::new(),
            tx: Mutex::new(Some(tx)),
            shared,
        }
    }
}

impl QueuedWriter {
    /// Returns a builder for a writer draining to `sink`.
    pub fn builder<S: Sink + 'static>(sink: S) -> Builder<S> {
        Builder {
            sink,
            cancel: None,
            capacity: DEFAULT_QUEUE_CAPACITY,
            tracker: None,
        }
    }

    /// Queues a buffer for delivery.
    ///
    /// Returns the full buffer length once the queue accepts it; acceptance
    /// is all-or-nothing and the sink is never touched synchronously. When
    /// the queue is full this suspends until the worker frees space, the
    /// writer is closed, or the cancellation token fires.
    ///
    /// Fails fast with [`WriteError::Cancelled`] once the token has fired,
    /// or with the latched error once one is set, without touching the
    /// queue.
    pub async fn write(&self, buf: Bytes) -> Result<usize, WriteError> {
        if self.cancel.is_cancelled() {
            return Err(WriteError::Cancelled);
        }
        if let Some(err) = self.shared.error.get() {
            return Err(err.clone());
        }

        // Clone the sender out of the lock; holding it across the await
        // would block `close` for the duration of a full-queue wait.
        let tx = {
            let guard = self.tx.lock();
            match guard.as_ref() {
                Some(tx) => tx.clone(),
                None => return Err(WriteError::Closed),
            }
        };

        let len = buf.len();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(WriteError::Cancelled),
            _ = self.closed.cancelled() => Err(WriteError::Closed),
            res = tx.send(buf) => match res {
                Ok(()) => Ok(len),
                // The worker dropped the receiver; it latched the cause
                // before exiting.
                Err(_) => Err(self
                    .shared
                    .error
                    .get()
                    .cloned()
                    .unwrap_or(WriteError::Closed)),
            },
        }
    }

    /// Closes the writer for further writes.
    ///
    /// Latches the [`WriteError::Closed`] sentinel and closes the producer
    /// side of the queue. Buffers already accepted keep draining in the
    /// background; this does not wait for them. Idempotent.
    pub fn close(&self) {
        self.shared.latch(WriteError::Closed);
        self.closed.cancel();
        self.tx.lock().take();
    }

    /// Returns the writer's current error, if any.
    ///
    /// Cancellation takes priority over any latched error. Never blocks.
    pub fn error(&self) -> Option<WriteError> {
        if self.cancel.is_cancelled() {
            return Some(WriteError::Cancelled);
        }
        self.shared.error.get().cloned()
    }

    /// Returns whether the worker has exited.
    ///
    /// This is an observation flag, not a synchronization primitive; to
    /// block until full drain, spawn the writer on a
    /// [`TaskTracker`](Builder::tracker) and wait on that.
    pub fn done(&self) -> bool {
        self.shared.done.load(Ordering::Acquire)
    }
}

/// Drains the queue into the sink until closure, sink failure, or
/// cancellation. Buffers still queued at an error exit are discarded.
async fn run<S: Sink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Bytes>,
    cancel: CancellationToken,
    shared: Arc<Shared>,
) {
    debug!("queued writer worker started");
    loop {
        // Biased so cancellation is observed before each delivery, even
        // with buffers ready in the queue.
        let buf = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("queued writer cancelled, discarding queued buffers");
                shared.latch(WriteError::Cancelled);
                break;
            }
            buf = rx.recv() => match buf {
                Some(buf) => buf,
                // Queue closed and empty: a clean drain, nothing to latch.
                None => break,
            },
        };

        if let Err(e) = sink.write(buf).await {
            warn!("sink write failed, discarding queued buffers: {}", e);
            shared.latch(WriteError::from(e));
            break;
        }
    }
    shared.done.store(true, Ordering::Release);
    debug!("queued writer worker exited");
}
