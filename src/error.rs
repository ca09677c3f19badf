//! Error types for the queued writer.

use std::io;
use std::sync::Arc;

/// Error reported by [`QueuedWriter`](crate::QueuedWriter) operations.
///
/// Errors are sticky: the first one latched by the writer stays latched for
/// the remainder of its lifetime, and every subsequent write fails fast with
/// the same value. Sink failures are shared between producers via `Arc`, so
/// the error is cheap to clone and every caller observes the same cause.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WriteError {
    /// The cancellation token supplied at construction fired.
    ///
    /// Takes priority over any previously latched error.
    #[error("cancelled")]
    Cancelled,
    /// The writer was closed via [`close`](crate::QueuedWriter::close).
    #[error("writer closed")]
    Closed,
    /// The sink rejected a delivery. No buffer after the failed one is
    /// delivered.
    #[error("sink error: {0}")]
    Sink(Arc<io::Error>),
}

impl WriteError {
    /// Returns true for the closed sentinel, letting callers distinguish
    /// "I closed this myself" from a sink failure.
    pub fn is_closed(&self) -> bool {
        matches!(self, WriteError::Closed)
    }

    /// Returns the underlying sink error, if any.
    pub fn sink_error(&self) -> Option<&io::Error> {
        match self {
            WriteError::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(e: io::Error) -> Self {
        WriteError::Sink(Arc::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        assert_eq!(WriteError::Cancelled.to_string(), "cancelled");
        assert_eq!(WriteError::Closed.to_string(), "writer closed");

        let err = WriteError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe burst"));
        assert!(err.to_string().contains("pipe burst"));
    }

    #[test]
    fn test_accessors() {
        assert!(WriteError::Closed.is_closed());
        assert!(!WriteError::Cancelled.is_closed());

        let err = WriteError::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(!err.is_closed());
        assert_eq!(err.sink_error().unwrap().to_string(), "boom");
        assert!(WriteError::Closed.sink_error().is_none());
    }

    #[test]
    fn test_clones_share_cause() {
        let err = WriteError::from(io::Error::new(io::ErrorKind::Other, "boom"));
        let clone = err.clone();
        assert_eq!(clone.to_string(), err.to_string());
    }
}
