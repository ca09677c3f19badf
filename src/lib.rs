//! An order-preserving queued writer for asynchronous byte delivery.
//!
//! [`QueuedWriter`] sits between any number of producers and a single
//! [`Sink`]: producers enqueue byte buffers without waiting on the sink's
//! I/O latency, and one background task delivers them in arrival order. The
//! queue is bounded, so a full queue suspends writers until the worker
//! catches up — backpressure is the only flow control.
//!
//! Failures are sticky. The first sink error, cancellation, or close is
//! latched for the writer's lifetime and every later write fails fast with
//! it, so producers get immediate feedback instead of queuing doomed
//! buffers. Cancellation is cooperative via
//! [`CancellationToken`](tokio_util::sync::CancellationToken): the worker
//! checks it between deliveries and suspended writes wake on it promptly.
//! Buffers still queued when the worker stops are dropped, not flushed.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use queued_writer::{QueuedWriter, SinkFn};
//! use std::sync::{Arc, Mutex};
//! use tokio_util::task::TaskTracker;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let out = Arc::new(Mutex::new(Vec::new()));
//! let sink = SinkFn({
//!     let out = out.clone();
//!     move |buf: Bytes| -> std::io::Result<()> {
//!         out.lock().unwrap().push(buf);
//!         Ok(())
//!     }
//! });
//!
//! let tracker = TaskTracker::new();
//! let writer = QueuedWriter::builder(sink).tracker(&tracker).spawn();
//!
//! writer.write(Bytes::from_static(b"line 1\n")).await.unwrap();
//! writer.write(Bytes::from_static(b"line 2\n")).await.unwrap();
//! writer.close();
//!
//! // Closing does not wait for drain; the tracker does.
//! tracker.close();
//! tracker.wait().await;
//! assert!(writer.done());
//! assert_eq!(out.lock().unwrap().len(), 2);
//! # }
//! ```

mod error;
mod sink;
mod writer;

pub use error::WriteError;
pub use sink::{Discard, IoSink, Sink, SinkFn};
pub use writer::{Builder, DEFAULT_QUEUE_CAPACITY, QueuedWriter};
