//! # Error Types
//!
//! One `thiserror` enum per layer, aggregated into [`NotaError`] at the job
//! level. Nothing in this crate retries on its own; every failure surfaces
//! to the caller as one of these.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Receipt document construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A service/product record violates the quantity invariants.
    #[error("Malformed line item '{name}': {reason}")]
    MalformedLineItem { name: String, reason: String },

    /// The loyalty snapshot cannot be projected.
    #[error("Invalid loyalty snapshot: {reason}")]
    InvalidLoyalty { reason: String },
}

/// Failures while finding and preparing a printer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    /// No Bluetooth LE support on this host.
    #[error("Bluetooth LE is not available: {0}")]
    UnsupportedPlatform(String),

    /// The user dismissed the device chooser.
    #[error("Device selection cancelled")]
    UserCancelled,

    /// No device was chosen before the discovery timeout.
    #[error("No printer selected within {0:?}")]
    DiscoveryTimeout(Duration),

    /// The GATT connection could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// None of the known printer services exist on the device.
    #[error("Device exposes none of the known printer services")]
    NoMatchingService,

    /// The resolved service has no characteristic that accepts writes.
    #[error("Service {0} has no writable characteristic")]
    NoWritableCharacteristic(Uuid),
}

impl NegotiationError {
    /// User dismissal is a normal way out, not a fault.
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, NegotiationError::UserCancelled)
    }
}

/// Errors raised by a delivery channel while writing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The characteristic write was rejected or failed.
    #[error("Write failed: {0}")]
    Write(String),

    /// The link went away mid-job.
    #[error("Device disconnected")]
    Disconnected,

    /// I/O error from a file-backed channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for nota operations
#[derive(Debug, Error)]
pub enum NotaError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// Mid-stream transport failure; `bytes_sent` bytes reached the printer.
    #[error("Print aborted after {bytes_sent} of {bytes_total} bytes: {source}")]
    ChunkWriteFailed {
        bytes_sent: usize,
        bytes_total: usize,
        #[source]
        source: TransportError,
    },

    /// A delivery channel could not be opened.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The job was cancelled between chunks.
    #[error("Print cancelled after {bytes_sent} bytes")]
    Cancelled { bytes_sent: usize },

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    Config(String),

    /// Input request could not be parsed
    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotaError {
    /// The user dismissed the device chooser.
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, NotaError::Negotiation(e) if e.is_user_cancelled())
    }

    /// Bytes that reached the printer before the job stopped, if it got
    /// as far as streaming.
    pub fn bytes_sent(&self) -> Option<usize> {
        match self {
            NotaError::ChunkWriteFailed { bytes_sent, .. } | NotaError::Cancelled { bytes_sent } => {
                Some(*bytes_sent)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_cancelled_flag() {
        assert!(NegotiationError::UserCancelled.is_user_cancelled());
        assert!(!NegotiationError::NoMatchingService.is_user_cancelled());
    }

    #[test]
    fn test_user_cancelled_through_nota_error() {
        assert!(NotaError::from(NegotiationError::UserCancelled).is_user_cancelled());
        assert!(!NotaError::from(NegotiationError::NoMatchingService).is_user_cancelled());
        assert!(!NotaError::Cancelled { bytes_sent: 0 }.is_user_cancelled());
    }

    #[test]
    fn test_bytes_sent() {
        let err = NotaError::ChunkWriteFailed {
            bytes_sent: 100,
            bytes_total: 200,
            source: TransportError::Disconnected,
        };
        assert_eq!(err.bytes_sent(), Some(100));
        assert_eq!(NotaError::Cancelled { bytes_sent: 7 }.bytes_sent(), Some(7));
        assert_eq!(NotaError::Config("x".into()).bytes_sent(), None);
    }

    #[test]
    fn test_messages() {
        let err = NotaError::from(BuildError::MalformedLineItem {
            name: "Cuci".into(),
            reason: "free quantity 3 exceeds total 2".into(),
        });
        assert_eq!(
            err.to_string(),
            "Malformed line item 'Cuci': free quantity 3 exceeds total 2"
        );
    }
}
